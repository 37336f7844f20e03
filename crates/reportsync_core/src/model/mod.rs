//! Domain model for the decision graph and its report projection.
//!
//! # Responsibility
//! - Define the canonical source-side graph: meetings, decisions and the
//!   closed set of sub-decision variants.
//! - Define the denormalized report-side shapes the projection writes.
//!
//! # Invariants
//! - Every entity is identified by its natural composite key; nothing in
//!   this crate mints surrogate ids.
//! - `SubDecisionBody` is a closed sum type; adding a variant must fail
//!   compilation at every dispatch site until handled.

pub mod decision;
pub mod meeting;
pub mod member;
pub mod organ;
pub mod report;
pub mod subdecision;
