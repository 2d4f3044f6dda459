//! Run execution tracking.
//!
//! This module covers the reliability half of the coordination core: the
//! run state machine, the idempotency/retry contract, and the services
//! translating executor outcomes into validated, version-matched writes.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
