//! Repository port for task persistence and version-matched updates.

use crate::task::domain::{
    ProjectId, Task, TaskChanges, TaskDependency, TaskId, TaskStatus, Version,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Applies a change set to the row matching both `id` and
    /// `expected_version`, returning the refreshed task with the version
    /// incremented by one.
    ///
    /// The update is transition-agnostic: validating the status change is
    /// the caller's responsibility before reaching for this primitive.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::VersionConflict`] when zero rows
    /// matched. A missing row is indistinguishable from a lost race at the
    /// store and is reported as the same conflict; either way the caller
    /// must re-read current state and re-decide.
    async fn update_with_version(
        &self,
        id: TaskId,
        expected_version: Version,
        changes: TaskChanges,
    ) -> TaskRepositoryResult<Task>;

    /// Returns all tasks in `status` for the project, ordered by the
    /// scheduling tie-break key `(priority asc, created_at asc, id asc)`.
    async fn list_by_status(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Stores a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when either endpoint does
    /// not exist.
    async fn add_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()>;

    /// Bulk-loads the dependency edges declared by any of `task_ids`.
    async fn list_dependencies(
        &self,
        task_ids: &[TaskId],
    ) -> TaskRepositoryResult<Vec<TaskDependency>>;

    /// Bulk-loads the status of every task in `ids` that exists.
    ///
    /// Missing ids are simply absent from the result map.
    async fn load_statuses(
        &self,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<HashMap<TaskId, TaskStatus>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The conditional update matched zero rows: a concurrent writer
    /// changed the entity since it was read.
    #[error("version conflict on task {id}: expected version {expected_version}")]
    VersionConflict {
        /// Task the update targeted.
        id: TaskId,
        /// Version the caller expected to find.
        expected_version: Version,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
