//! Executor outcome signals consumed by the run lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome reported by the executor for a running attempt.
///
/// The executor never picks run statuses itself; it reports what happened
/// and the state machine decides where the run lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The attempt completed successfully.
    Succeeded,
    /// The attempt failed. A retry time makes the failure retryable;
    /// computing it (backoff policy) is the executor's concern.
    Failed {
        /// When the attempt should be retried, if at all.
        next_retry_at: Option<DateTime<Utc>>,
    },
    /// The executing process restarted mid-flight.
    Interrupted,
}

/// Orchestrator decision for a run stranded in `Interrupted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionResolution {
    /// Resume execution.
    Resume,
    /// Give up on the attempt.
    GiveUp,
    /// Abandon the attempt.
    Cancel,
}
