//! Run lifecycle state machine and retry decision point.

use super::{ParseRunStatusError, RunDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created and waiting for an executor.
    Queued,
    /// Being executed.
    Running,
    /// Failed retryably; waiting for its retry time.
    RetryScheduled,
    /// Was mid-flight when the executing process restarted. Not a failure:
    /// the orchestrator must resolve it to `Running`, `Failed`, or
    /// `Cancelled`.
    Interrupted,
    /// Finished successfully. Terminal.
    Succeeded,
    /// Gave up. Terminal.
    Failed,
    /// Abandoned. Terminal.
    Cancelled,
}

impl RunStatus {
    /// Status every run is born in.
    pub const INITIAL: Self = Self::Queued;

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::RetryScheduled => "retry_scheduled",
            Self::Interrupted => "interrupted",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the targets reachable from this status.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Queued | Self::RetryScheduled => &[Self::Running, Self::Cancelled],
            Self::Running => &[
                Self::Succeeded,
                Self::Failed,
                Self::RetryScheduled,
                Self::Cancelled,
                Self::Interrupted,
            ],
            Self::Interrupted => &[Self::Running, Self::Failed, Self::Cancelled],
            Self::Succeeded | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Is this a terminal status? Terminal runs are immutable.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RunStatus {
    type Error = ParseRunStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "retry_scheduled" => Ok(Self::RetryScheduled),
            "interrupted" => Ok(Self::Interrupted),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseRunStatusError(value.to_owned())),
        }
    }
}

/// Validates a run status change against the transition table.
///
/// Writing the current status back is a no-op and always allowed.
///
/// # Errors
///
/// Returns [`RunDomainError::InvalidTransition`] naming the disallowed
/// pair and enumerating the allowed target set.
pub fn ensure_run_transition(current: RunStatus, target: RunStatus) -> Result<(), RunDomainError> {
    if current == target {
        return Ok(());
    }
    let allowed = current.allowed_targets();
    if allowed.contains(&target) {
        return Ok(());
    }
    Err(RunDomainError::InvalidTransition {
        from: current,
        to: target,
        allowed,
    })
}

/// Decides the status a failure lands in.
///
/// This is the single chokepoint for retryability: callers compute
/// `next_retry_at` through whatever backoff policy they carry, and the
/// presence of a retry time alone decides between rescheduling and giving
/// up.
#[must_use]
pub const fn resolve_failed_target(next_retry_at: Option<DateTime<Utc>>) -> RunStatus {
    match next_retry_at {
        Some(_) => RunStatus::RetryScheduled,
        None => RunStatus::Failed,
    }
}
