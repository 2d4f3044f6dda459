//! Error types for task domain validation and state transitions.

use super::{TaskCommand, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status change is not permitted from the current status.
    #[error(
        "invalid task transition {from} -> {to}, allowed targets: [{}]",
        format_statuses(allowed)
    )]
    InvalidTransition {
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the caller attempted to reach.
        to: TaskStatus,
        /// Targets the state machine permits from `from`.
        allowed: &'static [TaskStatus],
    },

    /// A newly created task carried a status other than the initial one.
    #[error("tasks must be created in status {initial}, got {0}", initial = TaskStatus::INITIAL)]
    InvalidInitialStatus(TaskStatus),

    /// The command is not defined for the current status.
    #[error("command {command} is not defined for status {status}")]
    InvalidCommand {
        /// Command the caller issued.
        command: TaskCommand,
        /// Status the task currently holds.
        status: TaskStatus,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A task declared itself as its own parent or dependency.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),
}

fn format_statuses(statuses: &[TaskStatus]) -> String {
    statuses
        .iter()
        .map(TaskStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing dependency kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown dependency kind: {0}")]
pub struct ParseDependencyKindError(pub String);
