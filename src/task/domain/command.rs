//! Externally-issued task commands.
//!
//! Commands are a convenience layer over raw transitions: each command maps
//! to a fixed target status for the statuses it is defined on, and every
//! resolved target is itself accepted by
//! [`ensure_transition`](super::ensure_transition).

use super::{TaskDomainError, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command an operator or orchestrator can issue against a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCommand {
    /// Suspend a running task.
    Pause,
    /// Resume a paused task.
    Resume,
    /// Re-enter the lifecycle after failure or cancellation.
    Retry,
    /// Abandon the task.
    Cancel,
}

impl TaskCommand {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Retry => "retry",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a command to its fixed target status for the current status.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidCommand`] when the command is not
/// defined for `current`.
pub const fn resolve_command_target(
    current: TaskStatus,
    command: TaskCommand,
) -> Result<TaskStatus, TaskDomainError> {
    match (command, current) {
        (TaskCommand::Pause, TaskStatus::Running) => Ok(TaskStatus::Blocked),
        (TaskCommand::Resume, TaskStatus::Blocked) => Ok(TaskStatus::Running),
        (TaskCommand::Retry, TaskStatus::Failed | TaskStatus::Cancelled) => Ok(TaskStatus::Todo),
        (
            TaskCommand::Cancel,
            TaskStatus::Todo | TaskStatus::Running | TaskStatus::Blocked,
        ) => Ok(TaskStatus::Cancelled),
        (command, status) => Err(TaskDomainError::InvalidCommand { command, status }),
    }
}
