//! Report projection core for the meeting/decision administration.
//!
//! Walks the canonical Meeting → Decision → SubDecision graph and
//! incrementally upserts a denormalized report copy, isolating failures
//! per decision. This crate is the single source of truth for the
//! projection's ordering and failure-handling invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::decision::{Decision, DecisionKey};
pub use model::meeting::{Meeting, MeetingKey, MeetingType};
pub use model::member::{Lidnr, Member};
pub use model::organ::{Organ, OrganMember};
pub use model::report::{
    ReportDecision, ReportEntity, ReportEntityKey, ReportMeeting, ReportSubDecision,
};
pub use model::subdecision::{OrganType, SubDecision, SubDecisionBody, SubDecisionKey};
pub use repo::report_store::{ReportStore, SqliteReportStore, StoreError, StoreResult};
pub use repo::source_repo::{
    SourceRepoError, SourceRepository, SourceResult, SqliteSourceRepository,
};
pub use service::notify::{FailureContext, FailureNotifier, LogNotifier};
pub use service::progress::{LogProgress, NullProgress, ProgressReporter};
pub use service::sync_service::{ReferenceRole, SyncError, SyncService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
