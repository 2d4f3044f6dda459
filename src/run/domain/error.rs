//! Error types for run domain validation and state transitions.

use super::RunStatus;
use thiserror::Error;

/// Violations of the run reliability contract.
///
/// These are data-integrity errors: they are rejected before persistence
/// and never coerced into a "nearby" valid state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunContractViolation {
    /// The idempotency key is empty or blank.
    #[error("idempotency key must not be blank")]
    BlankIdempotencyKey,

    /// A retry-scheduled run lacks a retry time.
    #[error("status retry_scheduled requires next_retry_at")]
    RetryTimeRequired,

    /// A run outside retry scheduling carries a retry time.
    #[error("status {0} must not carry next_retry_at")]
    RetryTimeForbidden(RunStatus),
}

/// Errors returned while transitioning or validating domain run values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunDomainError {
    /// The requested status change is not permitted from the current status.
    #[error(
        "invalid run transition {from} -> {to}, allowed targets: [{}]",
        format_statuses(allowed)
    )]
    InvalidTransition {
        /// Status the run currently holds.
        from: RunStatus,
        /// Status the caller attempted to reach.
        to: RunStatus,
        /// Targets the state machine permits from `from`.
        allowed: &'static [RunStatus],
    },

    /// The reliability contract was violated.
    #[error("run contract violated: {0}")]
    InvalidContract(#[from] RunContractViolation),
}

fn format_statuses(statuses: &[RunStatus]) -> String {
    statuses
        .iter()
        .map(RunStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned while parsing run statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown run status: {0}")]
pub struct ParseRunStatusError(pub String);
