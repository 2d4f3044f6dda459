//! Port contracts for run execution tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by run services.

pub mod repository;

pub use repository::{RunRepository, RunRepositoryError, RunRepositoryResult};
