//! Failure notification seam for per-decision projection errors.
//!
//! # Responsibility
//! - Carry a failed decision's identity to an external notifier.
//!
//! # Invariants
//! - Notification is fire-and-forget: notifier failures are not this
//!   core's concern and must not disturb the batch.

use crate::model::decision::DecisionKey;
use crate::model::meeting::MeetingType;
use crate::service::sync_service::SyncError;
use log::error;
use std::fmt::{Display, Formatter};

/// Identity of the decision whose synchronization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureContext {
    pub meeting_type: MeetingType,
    pub meeting_number: i32,
    pub decision_point: i32,
    pub decision_number: i32,
}

impl FailureContext {
    pub fn for_decision(key: &DecisionKey) -> Self {
        Self {
            meeting_type: key.meeting_type,
            meeting_number: key.meeting_number,
            decision_point: key.point,
            decision_number: key.number,
        }
    }
}

impl Display for FailureContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{}.{}",
            self.meeting_type, self.meeting_number, self.decision_point, self.decision_number
        )
    }
}

/// Receives per-decision projection failures.
pub trait FailureNotifier {
    fn notify(&self, error: &SyncError, context: &FailureContext);
}

impl<N: FailureNotifier + ?Sized> FailureNotifier for &N {
    fn notify(&self, error: &SyncError, context: &FailureContext) {
        (**self).notify(error, context);
    }
}

/// Notifier that reports failures through the logging backend.
///
/// The original system mails these; mail transport is outside this core.
pub struct LogNotifier;

impl FailureNotifier for LogNotifier {
    fn notify(&self, error: &SyncError, context: &FailureContext) {
        error!(
            "event=decision_sync_failed module=sync status=error decision={} error={}",
            context, error
        );
    }
}
