//! Dependency edges between tasks.

use super::{ParseDependencyKindError, TaskDomainError, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship kind carried by a dependency edge.
///
/// The base scheduling policy only consults the binary "is the predecessor
/// done" signal; the kind is retained for richer policies layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Successor may not start until the predecessor finishes.
    FinishToStart,
    /// Successor may not start until the predecessor starts.
    StartToStart,
    /// Successor may not finish until the predecessor finishes.
    FinishToFinish,
    /// Successor may not finish until the predecessor starts.
    StartToFinish,
}

impl DependencyKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FinishToStart => "finish_to_start",
            Self::StartToStart => "start_to_start",
            Self::FinishToFinish => "finish_to_finish",
            Self::StartToFinish => "start_to_finish",
        }
    }
}

impl Default for DependencyKind {
    fn default() -> Self {
        Self::FinishToStart
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DependencyKind {
    type Error = ParseDependencyKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "finish_to_start" => Ok(Self::FinishToStart),
            "start_to_start" => Ok(Self::StartToStart),
            "finish_to_finish" => Ok(Self::FinishToFinish),
            "start_to_finish" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyKindError(value.to_owned())),
        }
    }
}

/// Directed dependency edge: `task_id` waits for `depends_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskDependency {
    task_id: TaskId,
    depends_on: TaskId,
    kind: DependencyKind,
}

impl TaskDependency {
    /// Creates a validated dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] when a task depends on
    /// itself.
    pub const fn new(
        task_id: TaskId,
        depends_on: TaskId,
        kind: DependencyKind,
    ) -> Result<Self, TaskDomainError> {
        if task_id.into_inner().as_u128() == depends_on.into_inner().as_u128() {
            return Err(TaskDomainError::SelfDependency(task_id));
        }
        Ok(Self {
            task_id,
            depends_on,
            kind,
        })
    }

    /// Returns the waiting task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task being waited on.
    #[must_use]
    pub const fn depends_on(&self) -> TaskId {
        self.depends_on
    }

    /// Returns the relationship kind.
    #[must_use]
    pub const fn kind(&self) -> DependencyKind {
        self.kind
    }
}
