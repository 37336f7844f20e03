//! Sub-decision model: the closed variant set of concrete resolutions.
//!
//! # Responsibility
//! - Define the sub-decision identity and the tagged variant payloads,
//!   including their cross-references to other graph entities.
//!
//! # Invariants
//! - Cross-references are expressed as natural composite keys, never as
//!   assumed-present pointers; resolution happens at projection time.
//! - `content` carries upstream-rendered business text and is copied
//!   verbatim by the projection.

use crate::model::decision::DecisionKey;
use crate::model::meeting::MeetingType;
use crate::model::member::Lidnr;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Natural composite key of a sub-decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubDecisionKey {
    pub meeting_type: MeetingType,
    pub meeting_number: i32,
    pub decision_point: i32,
    pub decision_number: i32,
    pub number: i32,
}

impl SubDecisionKey {
    /// Key of the owning decision.
    pub fn decision(&self) -> DecisionKey {
        DecisionKey {
            meeting_type: self.meeting_type,
            meeting_number: self.meeting_number,
            point: self.decision_point,
            number: self.decision_number,
        }
    }
}

impl Display for SubDecisionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{}.{}.{}",
            self.meeting_type,
            self.meeting_number,
            self.decision_point,
            self.decision_number,
            self.number
        )
    }
}

/// Kind of organ a foundation creates.
///
/// Which kinds are allowed in which meeting type is enforced upstream;
/// the projection preserves the value verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganType {
    Committee,
    AvCommittee,
    Fraternity,
    AdvisoryCouncil,
}

/// Variant payloads of a sub-decision.
///
/// Installation carries a foundation reference: it installs a member into
/// a function of the organ created by that foundation. Board variants are
/// board-scoped and reference no organ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubDecisionBody {
    Foundation {
        name: String,
        abbreviation: String,
        organ_type: OrganType,
    },
    Installation {
        foundation: SubDecisionKey,
        function: String,
        member: Lidnr,
    },
    Discharge {
        installation: SubDecisionKey,
    },
    BoardInstallation {
        function: String,
        member: Lidnr,
        date: NaiveDate,
    },
    BoardRelease {
        installation: SubDecisionKey,
        date: NaiveDate,
    },
    BoardDischarge {
        installation: SubDecisionKey,
    },
    Budget {
        author: Option<Lidnr>,
        name: String,
        version: String,
        date: NaiveDate,
        approval: bool,
        changes: bool,
    },
    Reckoning {
        author: Option<Lidnr>,
        name: String,
        version: String,
        date: NaiveDate,
        approval: bool,
        changes: bool,
    },
    Destroy {
        target: DecisionKey,
    },
    Abolish {
        foundation: SubDecisionKey,
    },
    Other,
}

/// Source-side sub-decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDecision {
    pub key: SubDecisionKey,
    /// Upstream-rendered text; `None` projects as the empty string.
    pub content: Option<String>,
    pub body: SubDecisionBody,
}
