//! Member projection model.
//!
//! # Responsibility
//! - Define the report-side member shape referenced by installations and
//!   financial documents.
//!
//! # Invariants
//! - Members are looked up by membership number and never created by the
//!   projection; a missing member is a domain error at the call site.

use serde::{Deserialize, Serialize};

/// Membership number, the natural key of a member.
pub type Lidnr = u32;

/// Report-side member projection, maintained outside this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub lidnr: Lidnr,
    pub full_name: String,
}
