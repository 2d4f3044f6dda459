//! Foreman: coordination core for agent-executed work.
//!
//! This crate tracks units of agent work through an explicit lifecycle,
//! records every execution attempt under a reliability contract, and
//! proposes dependency-ready work to executors. All writes land through
//! version-matched conditional updates, so concurrent orchestrators
//! resolve races at the store rather than by locking.
//!
//! # Architecture
//!
//! Foreman follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, database)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, commands, dependencies, and scheduling
//! - [`run`]: Execution attempts, idempotency, and retry tracking
//! - [`fault`]: Deterministic failure injection for resilience drills

pub mod fault;
pub mod run;
pub mod task;
