//! Synchronization services and their collaborator seams.
//!
//! # Responsibility
//! - Orchestrate repository and store calls into the projection engine.
//! - Define the failure-notification and progress-reporting contracts
//!   for the surrounding application.

pub mod notify;
pub mod progress;
pub mod sync_service;
