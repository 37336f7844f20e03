//! Repository layer: query contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the source-repository and report-store contracts consumed by
//!   the synchronization engine.
//! - Keep SQL details and row codecs inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - The report store writes only through the staged-changes accumulator;
//!   nothing reaches disk before `commit()`.

pub(crate) mod columns;
pub mod report_store;
pub mod source_repo;
