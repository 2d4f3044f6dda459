//! Task lifecycle state machine.
//!
//! The status enum is the single source of truth for which lifecycle moves
//! are legal. Persistence adapters and services never encode transition
//! knowledge of their own; they ask [`ensure_transition`] and act on the
//! answer.

use super::{ParseTaskStatusError, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Ready for dispatch once dependencies are satisfied.
    Todo,
    /// Claimed by an agent and executing.
    Running,
    /// Execution finished; awaiting review.
    Review,
    /// Paused by an external command.
    Blocked,
    /// Reviewed and accepted. Fully terminal.
    Done,
    /// Execution gave up. Re-enterable only via the retry command.
    Failed,
    /// Abandoned by an external command. Re-enterable only via retry.
    Cancelled,
}

impl TaskStatus {
    /// Status every task is born in.
    pub const INITIAL: Self = Self::Todo;

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Running => "running",
            Self::Review => "review",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the targets reachable from this status.
    ///
    /// `Failed` and `Cancelled` list `Todo` because the retry command
    /// re-enters the lifecycle; `Done` admits no exits.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Todo => &[Self::Running, Self::Cancelled],
            Self::Running => &[Self::Review, Self::Blocked, Self::Failed, Self::Cancelled],
            Self::Review => &[Self::Done, Self::Running],
            Self::Blocked => &[Self::Running, Self::Cancelled],
            Self::Failed | Self::Cancelled => &[Self::Todo],
            Self::Done => &[],
        }
    }

    /// Is this status terminal with respect to forward progress?
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Blocked | Self::Failed | Self::Cancelled)
    }

    /// Does this status make the task count as a satisfied dependency?
    #[must_use]
    pub const fn satisfies_dependency(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "running" => Ok(Self::Running),
            "review" => Ok(Self::Review),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Validates a status change against the transition table.
///
/// Writing the current status back is a no-op and always allowed.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidTransition`] naming the disallowed
/// pair and enumerating the allowed target set.
pub fn ensure_transition(current: TaskStatus, target: TaskStatus) -> Result<(), TaskDomainError> {
    if current == target {
        return Ok(());
    }
    let allowed = current.allowed_targets();
    if allowed.contains(&target) {
        return Ok(());
    }
    Err(TaskDomainError::InvalidTransition {
        from: current,
        to: target,
        allowed,
    })
}

/// Validates the status of a task being created.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidInitialStatus`] unless the status is
/// [`TaskStatus::INITIAL`].
pub const fn validate_initial_status(status: TaskStatus) -> Result<(), TaskDomainError> {
    match status {
        TaskStatus::Todo => Ok(()),
        other => Err(TaskDomainError::InvalidInitialStatus(other)),
    }
}
