//! Service layer translating executor outcomes into run transitions.

use crate::run::{
    domain::{
        IdempotencyKey, InterruptionResolution, RunChanges, RunDomainError, RunId, RunOutcome,
        TaskRun,
    },
    ports::{RunRepository, RunRepositoryError},
};
use crate::task::domain::TaskId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for run lifecycle operations.
#[derive(Debug, Error)]
pub enum RunLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RunDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RunRepositoryError),
}

/// Result type for run lifecycle service operations.
pub type RunLifecycleResult<T> = Result<T, RunLifecycleError>;

/// Run lifecycle orchestration service.
///
/// Every write path validates the state transition and the reliability
/// contract before reaching the store, and lands through the
/// version-matched update so concurrent writers resolve deterministically.
#[derive(Clone)]
pub struct RunLifecycleService<R, C>
where
    R: RunRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RunLifecycleService<R, C>
where
    R: RunRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new run lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Dispatches a task: creates a `Queued` run carrying the attempt's
    /// idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Domain`] when the key is blank and
    /// [`RunLifecycleError::Repository`] with
    /// [`RunRepositoryError::DuplicateIdempotencyKey`] when the key is
    /// already taken, the signal that this attempt was already dispatched.
    pub async fn dispatch(
        &self,
        task_id: TaskId,
        idempotency_key: impl Into<String> + Send,
    ) -> RunLifecycleResult<TaskRun> {
        let key = IdempotencyKey::new(idempotency_key).map_err(RunDomainError::from)?;
        let run = TaskRun::create(task_id, key, &*self.clock)?;
        self.repository.store(&run).await?;
        tracing::info!(run_id = %run.id(), %task_id, "run dispatched");
        Ok(run)
    }

    /// Starts (or resumes) execution of a run.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError`] when the transition is illegal or the
    /// conditional write fails.
    pub async fn start(&self, run: &TaskRun) -> RunLifecycleResult<TaskRun> {
        let changes = run.start_changes(&*self.clock)?;
        let updated = self.write(run, changes).await?;
        tracing::debug!(run_id = %updated.id(), "run started");
        Ok(updated)
    }

    /// Records the executor's outcome for a running attempt.
    ///
    /// Failures land in `RetryScheduled` or `Failed` depending on whether
    /// the executor supplied a retry time; interruptions land in
    /// `Interrupted` awaiting resolution.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError`] when the transition or contract is
    /// rejected, or when the conditional write fails.
    pub async fn record_outcome(
        &self,
        run: &TaskRun,
        outcome: RunOutcome,
    ) -> RunLifecycleResult<TaskRun> {
        let changes = run.outcome_changes(outcome, &*self.clock)?;
        let updated = self.write(run, changes).await?;
        tracing::info!(
            run_id = %updated.id(),
            status = %updated.status(),
            "run outcome recorded"
        );
        Ok(updated)
    }

    /// Resolves a run stranded in `Interrupted` after a process restart.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError`] when the run is not interrupted or
    /// the conditional write fails.
    pub async fn resolve_interrupted(
        &self,
        run: &TaskRun,
        resolution: InterruptionResolution,
    ) -> RunLifecycleResult<TaskRun> {
        let changes = run.interruption_changes(resolution, &*self.clock)?;
        let updated = self.write(run, changes).await?;
        tracing::info!(
            run_id = %updated.id(),
            status = %updated.status(),
            "interrupted run resolved"
        );
        Ok(updated)
    }

    /// Abandons a run.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError`] when the run is already terminal or
    /// the conditional write fails.
    pub async fn cancel(&self, run: &TaskRun) -> RunLifecycleResult<TaskRun> {
        let changes = run.cancel_changes(&*self.clock)?;
        self.write(run, changes).await
    }

    /// Retrieves a run by identifier.
    ///
    /// Returns `Ok(None)` when the run does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: RunId) -> RunLifecycleResult<Option<TaskRun>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Retrieves a run by idempotency key.
    ///
    /// Returns `Ok(None)` when no run carries the key.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when the lookup fails.
    pub async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> RunLifecycleResult<Option<TaskRun>> {
        Ok(self.repository.find_by_idempotency_key(key).await?)
    }

    /// Returns all runs for a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when the lookup fails.
    pub async fn list_by_task(&self, task_id: TaskId) -> RunLifecycleResult<Vec<TaskRun>> {
        Ok(self.repository.list_by_task(task_id).await?)
    }

    async fn write(&self, run: &TaskRun, changes: RunChanges) -> RunLifecycleResult<TaskRun> {
        let updated = self
            .repository
            .update_with_version(run.id(), run.version(), changes)
            .await
            .inspect_err(|err| {
                if matches!(err, RunRepositoryError::VersionConflict { .. }) {
                    tracing::warn!(run_id = %run.id(), "run update lost the race");
                }
            })?;
        Ok(updated)
    }
}
