//! The run reliability contract.
//!
//! Every write path that sets a run's status or retry time funnels through
//! [`validate_contract`] before touching the store; the same invariants
//! are additionally backed by constraints at the data-store level.

use super::{RunContractViolation, RunDomainError, RunStatus};
use chrono::{DateTime, Utc};

/// Validates the reliability invariants for a proposed run state.
///
/// The contract: the idempotency key is never blank, and `next_retry_at`
/// is present if and only if the run is `RetryScheduled`.
///
/// # Errors
///
/// Returns [`RunDomainError::InvalidContract`] naming the violated
/// invariant.
pub fn validate_contract(
    status: RunStatus,
    idempotency_key: &str,
    next_retry_at: Option<DateTime<Utc>>,
) -> Result<(), RunDomainError> {
    if idempotency_key.trim().is_empty() {
        return Err(RunContractViolation::BlankIdempotencyKey.into());
    }
    match (status, next_retry_at) {
        (RunStatus::RetryScheduled, None) => Err(RunContractViolation::RetryTimeRequired.into()),
        (RunStatus::RetryScheduled, Some(_)) | (_, None) => Ok(()),
        (other, Some(_)) => Err(RunContractViolation::RetryTimeForbidden(other).into()),
    }
}
