//! Meeting model.
//!
//! # Responsibility
//! - Define the meeting identity `(type, number)` and the source-side
//!   meeting aggregate with its ordered decisions.
//!
//! # Invariants
//! - Meeting identity is immutable once created; only the date may change
//!   through re-projection.
//! - `decisions` preserves source ordering.

use crate::model::decision::Decision;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Kind of organizational gathering.
///
/// The value constrains which organ types may be founded in it (enforced
/// upstream); the projection preserves it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    /// General assembly.
    Av,
    /// Board meeting.
    Bv,
    /// Advisory meeting.
    Vv,
    /// Virtual meeting.
    Virt,
}

impl MeetingType {
    /// Canonical short code, also used as database text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Av => "AV",
            Self::Bv => "BV",
            Self::Vv => "VV",
            Self::Virt => "Virt",
        }
    }

    /// Parses the canonical short code.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AV" => Some(Self::Av),
            "BV" => Some(Self::Bv),
            "VV" => Some(Self::Vv),
            "Virt" => Some(Self::Virt),
            _ => None,
        }
    }
}

impl Display for MeetingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural composite key of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingKey {
    #[serde(rename = "type")]
    pub kind: MeetingType,
    pub number: i32,
}

impl Display for MeetingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.number)
    }
}

/// Source-side meeting aggregate with its eager decision sub-graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "type")]
    pub kind: MeetingType,
    pub number: i32,
    pub date: NaiveDate,
    /// Decisions in stable `(point, number)` order.
    pub decisions: Vec<Decision>,
}

impl Meeting {
    pub fn key(&self) -> MeetingKey {
        MeetingKey {
            kind: self.kind,
            number: self.number,
        }
    }
}
