//! Derived organ records, report-side only.
//!
//! # Responsibility
//! - Define the organ created by a Foundation projection and the organ
//!   membership created by an Installation projection.
//!
//! # Invariants
//! - An organ is keyed by its founding sub-decision; an organ member by
//!   its installing sub-decision.
//! - `discharge_date` is maintained by organ bookkeeping outside this
//!   core; the deletion cascade only clears it.

use crate::model::member::Lidnr;
use crate::model::subdecision::{OrganType, SubDecisionKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sub-body of the organization, derived from a Foundation sub-decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organ {
    /// Key of the founding sub-decision.
    pub foundation: SubDecisionKey,
    pub name: String,
    pub abbreviation: String,
    pub organ_type: OrganType,
}

/// Membership of an organ for the duration of an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganMember {
    /// Key of the installing sub-decision.
    pub installation: SubDecisionKey,
    /// Key of the organ's founding sub-decision.
    pub foundation: SubDecisionKey,
    pub lidnr: Lidnr,
    pub function: String,
    pub discharge_date: Option<NaiveDate>,
}
