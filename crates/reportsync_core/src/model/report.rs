//! Report-side entity shapes and the staging currency.
//!
//! # Responsibility
//! - Define the denormalized report copies of meeting, decision and
//!   sub-decision, plus the tagged unions staged against the report
//!   store.
//!
//! # Invariants
//! - `ReportDecision::content` equals the space-joined rendered content
//!   of its sub-decisions, empty string when there are none.
//! - `ReportSubDecision::discharged_by` is the discharge back-reference;
//!   it is meaningful for installation kinds only.

use crate::model::decision::DecisionKey;
use crate::model::meeting::{MeetingKey, MeetingType};
use crate::model::organ::{Organ, OrganMember};
use crate::model::subdecision::{SubDecisionBody, SubDecisionKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Report copy of a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeeting {
    #[serde(rename = "type")]
    pub kind: MeetingType,
    pub number: i32,
    pub date: NaiveDate,
}

impl ReportMeeting {
    pub fn key(&self) -> MeetingKey {
        MeetingKey {
            kind: self.kind,
            number: self.number,
        }
    }
}

/// Report copy of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDecision {
    pub key: DecisionKey,
    /// Space-joined rendered content of the sub-decisions.
    pub content: String,
}

/// Report copy of a sub-decision.
///
/// References inside `body` have been resolved against the report store
/// at projection time; the keys stored here are known to exist there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubDecision {
    pub key: SubDecisionKey,
    /// Rendered text, never null on the report side.
    pub content: String,
    pub body: SubDecisionBody,
    /// Set when a (board) discharge referencing this installation is
    /// projected; cleared by that discharge's deletion cascade.
    pub discharged_by: Option<SubDecisionKey>,
}

/// The five report-side entity kinds accepted by the staging interface.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEntity {
    Meeting(ReportMeeting),
    Decision(ReportDecision),
    SubDecision(ReportSubDecision),
    Organ(Organ),
    OrganMember(OrganMember),
}

impl ReportEntity {
    pub fn key(&self) -> ReportEntityKey {
        match self {
            Self::Meeting(meeting) => ReportEntityKey::Meeting(meeting.key()),
            Self::Decision(decision) => ReportEntityKey::Decision(decision.key),
            Self::SubDecision(sub) => ReportEntityKey::SubDecision(sub.key),
            Self::Organ(organ) => ReportEntityKey::Organ(organ.foundation),
            Self::OrganMember(member) => ReportEntityKey::OrganMember(member.installation),
        }
    }
}

/// Key forms matching `ReportEntity`, used for staged removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEntityKey {
    Meeting(MeetingKey),
    Decision(DecisionKey),
    SubDecision(SubDecisionKey),
    /// Keyed by the founding sub-decision.
    Organ(SubDecisionKey),
    /// Keyed by the installing sub-decision.
    OrganMember(SubDecisionKey),
}
