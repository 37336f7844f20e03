//! Meeting/decision synchronization engine.
//!
//! # Responsibility
//! - Project the canonical decision graph into the report store:
//!   batch regeneration, per-meeting and per-decision upserts,
//!   sub-decision transcoding, and the deletion cascade.
//!
//! # Invariants
//! - A decision is the unit of atomic projection: any error inside one
//!   decision aborts that whole decision and rolls its staged rows back.
//! - A meeting is the unit of fault isolation: a failed decision is
//!   reported to the failure notifier and the run continues.
//! - Every cross-reference must resolve against the report store at
//!   projection time; a missing counterpart is a dangling-reference
//!   error, never a silent skip.
//! - The engine stages changes only; commits happen at meeting
//!   granularity in the batch loop, or by the caller otherwise.

use crate::model::decision::{Decision, DecisionKey};
use crate::model::meeting::Meeting;
use crate::model::member::{Lidnr, Member};
use crate::model::organ::{Organ, OrganMember};
use crate::model::report::{ReportDecision, ReportEntity, ReportEntityKey, ReportMeeting, ReportSubDecision};
use crate::model::subdecision::{SubDecision, SubDecisionBody, SubDecisionKey};
use crate::repo::report_store::{ReportStore, StoreError};
use crate::repo::source_repo::{SourceRepoError, SourceRepository};
use crate::service::notify::{FailureContext, FailureNotifier};
use crate::service::progress::ProgressReporter;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a dangling sub-decision reference was supposed to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    Installation,
    Foundation,
}

impl ReferenceRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::Installation => "installation",
            Self::Foundation => "foundation",
        }
    }
}

/// Errors raised by the synchronization engine.
#[derive(Debug)]
pub enum SyncError {
    Store(StoreError),
    Source(SourceRepoError),
    /// The decision's meeting has no counterpart in the report store.
    DecisionWithoutMeeting(DecisionKey),
    /// A sub-decision reference has no counterpart in the report store.
    DanglingReference {
        role: ReferenceRole,
        key: SubDecisionKey,
    },
    /// A destroy target has no counterpart in the report store.
    DanglingDecision(DecisionKey),
    /// A referenced member projection does not exist.
    UnknownMember(Lidnr),
    /// A foundation has no derived organ record.
    MissingOrgan(SubDecisionKey),
    /// Deletion was requested for a decision that was never projected.
    MissingDecision(DecisionKey),
    /// Deletion of destroy sub-decisions is not implemented.
    UnsupportedDeletion(SubDecisionKey),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Source(err) => write!(f, "{err}"),
            Self::DecisionWithoutMeeting(key) => write!(f, "decision without meeting: {key}"),
            Self::DanglingReference { role, key } => write!(
                f,
                "dangling {} reference: {key} not present in report store",
                role.as_str()
            ),
            Self::DanglingDecision(key) => {
                write!(f, "dangling decision reference: {key} not present in report store")
            }
            Self::UnknownMember(lidnr) => write!(f, "unknown member: lidnr {lidnr}"),
            Self::MissingOrgan(key) => write!(f, "foundation {key} has no derived organ"),
            Self::MissingDecision(key) => {
                write!(f, "decision {key} not present in report store")
            }
            Self::UnsupportedDeletion(key) => {
                write!(f, "deletion of destroy sub-decision {key} is not implemented")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SourceRepoError> for SyncError {
    fn from(value: SourceRepoError) -> Self {
        Self::Source(value)
    }
}

/// One-way projection engine from the canonical graph to a report store.
pub struct SyncService<S: ReportStore, N: FailureNotifier> {
    store: S,
    notifier: N,
}

impl<S: ReportStore, N: FailureNotifier> SyncService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Regenerates the report store for every meeting in the source.
    ///
    /// Commits and clears the unit of work after each meeting to bound
    /// memory across a large corpus. Re-running is idempotent through
    /// upsert-by-key; report rows whose source rows were deleted since a
    /// previous run are not cleaned up.
    ///
    /// # Errors
    /// - Source loading and commit failures are batch-fatal; per-decision
    ///   failures are isolated inside `generate_meeting`.
    pub fn generate(
        &mut self,
        source: &impl SourceRepository,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), SyncError> {
        let meetings = source.find_all_meetings()?;
        let total = meetings.len();
        info!("event=report_generate module=sync status=start total={total}");

        for (index, meeting) in meetings.iter().enumerate() {
            self.generate_meeting(meeting)?;
            self.store.commit()?;
            self.store.clear_unit_of_work();
            progress.on_progress(index + 1, total);
        }

        // Safety net; each loop iteration already committed and cleared.
        self.store.commit()?;
        info!("event=report_generate module=sync status=ok total={total}");

        Ok(())
    }

    /// Upserts one meeting and synchronizes its decisions, isolating
    /// per-decision failures.
    ///
    /// A failed decision's staged rows are rolled back before the run
    /// continues, so nothing half-projected reaches `commit()`.
    pub fn generate_meeting(&mut self, meeting: &Meeting) -> Result<(), SyncError> {
        let report_meeting = match self.store.find_meeting(&meeting.key())? {
            Some(mut existing) => {
                existing.date = meeting.date;
                existing
            }
            None => ReportMeeting {
                kind: meeting.kind,
                number: meeting.number,
                date: meeting.date,
            },
        };

        for decision in &meeting.decisions {
            let checkpoint = self.store.staged_checkpoint();
            if let Err(err) = self.generate_decision(decision, Some(&report_meeting)) {
                self.store.rollback_staged(checkpoint);
                let context = FailureContext::for_decision(&decision.key);
                error!(
                    "event=decision_sync module=sync status=error decision={} error={}",
                    context, err
                );
                self.notifier.notify(&err, &context);
            }
        }

        self.store.upsert(ReportEntity::Meeting(report_meeting))?;
        Ok(())
    }

    /// Upserts one decision and all its sub-decisions.
    ///
    /// When no report meeting is supplied it is resolved by key;
    /// a missing meeting is a structural error. Sub-decision failures
    /// abort the whole decision.
    pub fn generate_decision(
        &mut self,
        decision: &Decision,
        report_meeting: Option<&ReportMeeting>,
    ) -> Result<(), SyncError> {
        if report_meeting.is_none()
            && self.store.find_meeting(&decision.key.meeting())?.is_none()
        {
            return Err(SyncError::DecisionWithoutMeeting(decision.key));
        }

        let mut report_decision = match self.store.find_decision(&decision.key)? {
            Some(existing) => existing,
            None => ReportDecision {
                key: decision.key,
                content: String::new(),
            },
        };

        let mut content = Vec::with_capacity(decision.subdecisions.len());
        for subdecision in &decision.subdecisions {
            self.generate_subdecision(subdecision, &report_decision)?;
            content.push(subdecision.content.clone().unwrap_or_default());
        }

        report_decision.content = content.join(" ");
        self.store.upsert(ReportEntity::Decision(report_decision))?;
        Ok(())
    }

    /// Transcodes one sub-decision into its report counterpart.
    ///
    /// Reuses an existing report row by key when present; resolves every
    /// cross-reference against the report store; stages derived organ and
    /// organ-member records where the variant calls for them.
    pub fn generate_subdecision(
        &mut self,
        subdecision: &SubDecision,
        report_decision: &ReportDecision,
    ) -> Result<ReportSubDecision, SyncError> {
        let existing = self.store.find_subdecision(&subdecision.key)?;

        match &subdecision.body {
            SubDecisionBody::Foundation {
                name,
                abbreviation,
                organ_type,
            } => {
                self.store.upsert(ReportEntity::Organ(Organ {
                    foundation: subdecision.key,
                    name: name.clone(),
                    abbreviation: abbreviation.clone(),
                    organ_type: *organ_type,
                }))?;
            }
            SubDecisionBody::Installation {
                foundation,
                function,
                member,
            } => {
                self.resolve_subdecision(*foundation, ReferenceRole::Foundation)?;
                let organ = self
                    .store
                    .find_organ(foundation)?
                    .ok_or(SyncError::MissingOrgan(*foundation))?;
                let member = self.find_member(*member)?;
                let discharge_date = self
                    .store
                    .find_organ_member(&subdecision.key)?
                    .and_then(|existing| existing.discharge_date);

                self.store.upsert(ReportEntity::OrganMember(OrganMember {
                    installation: subdecision.key,
                    foundation: organ.foundation,
                    lidnr: member.lidnr,
                    function: function.clone(),
                    discharge_date,
                }))?;
            }
            SubDecisionBody::Discharge { installation }
            | SubDecisionBody::BoardDischarge { installation } => {
                let mut installed =
                    self.resolve_subdecision(*installation, ReferenceRole::Installation)?;
                installed.discharged_by = Some(subdecision.key);
                self.store.upsert(ReportEntity::SubDecision(installed))?;
            }
            SubDecisionBody::BoardInstallation { member, .. } => {
                self.find_member(*member)?;
            }
            SubDecisionBody::BoardRelease { installation, .. } => {
                self.resolve_subdecision(*installation, ReferenceRole::Installation)?;
            }
            SubDecisionBody::Budget { author, .. } | SubDecisionBody::Reckoning { author, .. } => {
                if let Some(author) = author {
                    self.find_member(*author)?;
                }
            }
            SubDecisionBody::Destroy { target } => {
                if self.store.find_decision(target)?.is_none() {
                    return Err(SyncError::DanglingDecision(*target));
                }
            }
            SubDecisionBody::Abolish { foundation } => {
                self.resolve_subdecision(*foundation, ReferenceRole::Foundation)?;
            }
            SubDecisionBody::Other => {}
        }

        debug_assert_eq!(subdecision.key.decision(), report_decision.key);
        let report_subdecision = ReportSubDecision {
            key: subdecision.key,
            content: subdecision.content.clone().unwrap_or_default(),
            body: subdecision.body.clone(),
            discharged_by: existing.and_then(|found| found.discharged_by),
        };
        self.store
            .upsert(ReportEntity::SubDecision(report_subdecision.clone()))?;

        Ok(report_subdecision)
    }

    /// Removes a projected decision and its derived side entities.
    ///
    /// Sub-decisions are deleted in reverse order because later ones may
    /// reference earlier ones. Stages only; the caller commits.
    pub fn delete_decision(&mut self, key: &DecisionKey) -> Result<(), SyncError> {
        if self.store.find_decision(key)?.is_none() {
            return Err(SyncError::MissingDecision(*key));
        }

        let subdecisions = self.store.find_decision_subdecisions(key)?;
        for subdecision in subdecisions.iter().rev() {
            self.delete_subdecision(subdecision)?;
        }

        self.store.remove(ReportEntityKey::Decision(*key))?;
        Ok(())
    }

    /// Removes one projected sub-decision with variant-specific cleanup.
    pub fn delete_subdecision(
        &mut self,
        subdecision: &ReportSubDecision,
    ) -> Result<(), SyncError> {
        match &subdecision.body {
            SubDecisionBody::Destroy { .. } => {
                return Err(SyncError::UnsupportedDeletion(subdecision.key));
            }
            SubDecisionBody::Discharge { installation }
            | SubDecisionBody::BoardDischarge { installation } => {
                let mut installed =
                    self.resolve_subdecision(*installation, ReferenceRole::Installation)?;
                installed.discharged_by = None;
                self.store.upsert(ReportEntity::SubDecision(installed))?;

                if let Some(mut organ_member) = self.store.find_organ_member(installation)? {
                    organ_member.discharge_date = None;
                    self.store
                        .upsert(ReportEntity::OrganMember(organ_member))?;
                }
            }
            SubDecisionBody::Foundation { .. } => {
                if self.store.find_organ(&subdecision.key)?.is_none() {
                    return Err(SyncError::MissingOrgan(subdecision.key));
                }
                self.store
                    .remove(ReportEntityKey::Organ(subdecision.key))?;
            }
            SubDecisionBody::Installation { .. } => {
                if self.store.find_organ_member(&subdecision.key)?.is_some() {
                    self.store
                        .remove(ReportEntityKey::OrganMember(subdecision.key))?;
                }
            }
            SubDecisionBody::BoardInstallation { .. }
            | SubDecisionBody::BoardRelease { .. }
            | SubDecisionBody::Budget { .. }
            | SubDecisionBody::Reckoning { .. }
            | SubDecisionBody::Abolish { .. }
            | SubDecisionBody::Other => {}
        }

        self.store
            .remove(ReportEntityKey::SubDecision(subdecision.key))?;
        Ok(())
    }

    /// Resolves a member projection, failing when it does not exist.
    pub fn find_member(&self, lidnr: Lidnr) -> Result<Member, SyncError> {
        self.store
            .find_member(lidnr)?
            .ok_or(SyncError::UnknownMember(lidnr))
    }

    fn resolve_subdecision(
        &self,
        key: SubDecisionKey,
        role: ReferenceRole,
    ) -> Result<ReportSubDecision, SyncError> {
        self.store
            .find_subdecision(&key)?
            .ok_or(SyncError::DanglingReference { role, key })
    }
}
