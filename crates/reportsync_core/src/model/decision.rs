//! Decision model.
//!
//! # Responsibility
//! - Define the decision identity `(meeting type, meeting number, point,
//!   number)` and the source-side aggregate with its ordered
//!   sub-decisions.
//!
//! # Invariants
//! - A decision belongs to exactly one meeting, encoded in its key.
//! - `subdecisions` preserves source ordering.

use crate::model::meeting::{MeetingKey, MeetingType};
use crate::model::subdecision::SubDecision;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Natural composite key of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionKey {
    pub meeting_type: MeetingType,
    pub meeting_number: i32,
    pub point: i32,
    pub number: i32,
}

impl DecisionKey {
    /// Key of the owning meeting.
    pub fn meeting(&self) -> MeetingKey {
        MeetingKey {
            kind: self.meeting_type,
            number: self.meeting_number,
        }
    }
}

impl Display for DecisionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{}.{}",
            self.meeting_type, self.meeting_number, self.point, self.number
        )
    }
}

/// Source-side decision aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub key: DecisionKey,
    /// Sub-decisions in stable `number` order.
    pub subdecisions: Vec<SubDecision>,
}
