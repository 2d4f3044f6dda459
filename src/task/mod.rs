//! Task lifecycle coordination.
//!
//! This module covers the task half of the coordination core: the
//! lifecycle state machine and its command layer, dependency edges, the
//! version-matched repository contract, and the dependency-aware
//! scheduler. The module follows hexagonal architecture:
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
