//! Domain model for run execution attempts.
//!
//! The run domain models the execution-attempt state machine and the
//! reliability contract: every attempt carries a unique idempotency key,
//! and a retry time exists exactly when the attempt is scheduled for
//! retry. State machines here are pure; all mutable state lives behind
//! the repository ports.

mod contract;
mod error;
mod ids;
mod outcome;
mod run;
mod status;

pub use contract::validate_contract;
pub use error::{ParseRunStatusError, RunContractViolation, RunDomainError};
pub use ids::{IdempotencyKey, RunId};
pub use outcome::{InterruptionResolution, RunOutcome};
pub use run::{PersistedRunData, RunChanges, TaskRun};
pub use status::{RunStatus, ensure_run_transition, resolve_failed_target};
