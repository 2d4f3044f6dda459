//! Repository port for run persistence and version-matched updates.

use crate::run::domain::{IdempotencyKey, RunChanges, RunId, TaskRun};
use crate::task::domain::{TaskId, Version};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for run repository operations.
pub type RunRepositoryResult<T> = Result<T, RunRepositoryError>;

/// Run persistence contract.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Stores a new run.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::DuplicateRun`] when the run ID already
    /// exists or [`RunRepositoryError::DuplicateIdempotencyKey`] when the
    /// key is already taken, the at-most-once guarantee at the store.
    async fn store(&self, run: &TaskRun) -> RunRepositoryResult<()>;

    /// Finds a run by identifier.
    ///
    /// Returns `None` when the run does not exist.
    async fn find_by_id(&self, id: RunId) -> RunRepositoryResult<Option<TaskRun>>;

    /// Finds a run by its idempotency key.
    ///
    /// Returns `None` when no run carries the key.
    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> RunRepositoryResult<Option<TaskRun>>;

    /// Returns all runs for a task, oldest first.
    async fn list_by_task(&self, task_id: TaskId) -> RunRepositoryResult<Vec<TaskRun>>;

    /// Applies a change set to the row matching both `id` and
    /// `expected_version`, returning the refreshed run with the version
    /// incremented by one.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::VersionConflict`] when zero rows
    /// matched; the caller must re-read current state and re-decide rather
    /// than blindly retry the same write.
    async fn update_with_version(
        &self,
        id: RunId,
        expected_version: Version,
        changes: RunChanges,
    ) -> RunRepositoryResult<TaskRun>;
}

/// Errors returned by run repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RunRepositoryError {
    /// A run with the same identifier already exists.
    #[error("duplicate run identifier: {0}")]
    DuplicateRun(RunId),

    /// The idempotency key is already taken by another run.
    #[error("duplicate idempotency key: {0}")]
    DuplicateIdempotencyKey(IdempotencyKey),

    /// The run was not found.
    #[error("run not found: {0}")]
    NotFound(RunId),

    /// The conditional update matched zero rows: a concurrent writer
    /// changed the entity since it was read.
    #[error("version conflict on run {id}: expected version {expected_version}")]
    VersionConflict {
        /// Run the update targeted.
        id: RunId,
        /// Version the caller expected to find.
        expected_version: Version,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RunRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
