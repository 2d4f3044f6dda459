//! Run aggregate root and change-set types.

use super::{
    IdempotencyKey, InterruptionResolution, RunDomainError, RunId, RunOutcome, RunStatus,
    ensure_run_transition, resolve_failed_target, validate_contract,
};
use crate::task::domain::{TaskId, Version};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One execution attempt of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    id: RunId,
    task_id: TaskId,
    status: RunStatus,
    idempotency_key: IdempotencyKey,
    next_retry_at: Option<DateTime<Utc>>,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted run aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRunData {
    /// Persisted run identifier.
    pub id: RunId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted lifecycle status.
    pub status: RunStatus,
    /// Persisted idempotency key.
    pub idempotency_key: IdempotencyKey,
    /// Persisted retry time, if any.
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Persisted optimistic-lock version.
    pub version: Version,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskRun {
    /// Creates a new run in the initial `Queued` status.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidContract`] if the initial state
    /// would violate the reliability contract. The key type already rejects
    /// blank values; the contract check still runs here because it runs on
    /// every write path.
    pub fn create(
        task_id: TaskId,
        idempotency_key: IdempotencyKey,
        clock: &impl Clock,
    ) -> Result<Self, RunDomainError> {
        validate_contract(RunStatus::INITIAL, idempotency_key.as_str(), None)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: RunId::new(),
            task_id,
            status: RunStatus::INITIAL,
            idempotency_key,
            next_retry_at: None,
            version: Version::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a run from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRunData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            status: data.status,
            idempotency_key: data.idempotency_key,
            next_retry_at: data.next_retry_at,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn id(&self) -> RunId {
        self.id
    }

    /// Returns the task this run executes.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the idempotency key.
    #[must_use]
    pub const fn idempotency_key(&self) -> &IdempotencyKey {
        &self.idempotency_key
    }

    /// Returns the scheduled retry time, if any.
    #[must_use]
    pub const fn next_retry_at(&self) -> Option<DateTime<Utc>> {
        self.next_retry_at
    }

    /// Returns the optimistic-lock version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Resolves the change set that starts (or resumes) execution.
    ///
    /// Legal from `Queued`, `RetryScheduled`, and `Interrupted`; clears
    /// any pending retry time.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError`] when the transition or the resulting
    /// contract state is rejected.
    pub fn start_changes(&self, clock: &impl Clock) -> Result<RunChanges, RunDomainError> {
        self.changes_to(RunStatus::Running, None, clock)
    }

    /// Resolves the change set an executor outcome produces.
    ///
    /// Failures are routed through [`resolve_failed_target`]: a supplied
    /// retry time lands in `RetryScheduled`, none lands in `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError`] when the transition or the resulting
    /// contract state is rejected.
    pub fn outcome_changes(
        &self,
        outcome: RunOutcome,
        clock: &impl Clock,
    ) -> Result<RunChanges, RunDomainError> {
        match outcome {
            RunOutcome::Succeeded => self.changes_to(RunStatus::Succeeded, None, clock),
            RunOutcome::Failed { next_retry_at } => {
                self.changes_to(resolve_failed_target(next_retry_at), next_retry_at, clock)
            }
            RunOutcome::Interrupted => self.changes_to(RunStatus::Interrupted, None, clock),
        }
    }

    /// Resolves the change set for a run stranded in `Interrupted`.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTransition`] when the run is not
    /// actually interrupted.
    pub fn interruption_changes(
        &self,
        resolution: InterruptionResolution,
        clock: &impl Clock,
    ) -> Result<RunChanges, RunDomainError> {
        let target = match resolution {
            InterruptionResolution::Resume => RunStatus::Running,
            InterruptionResolution::GiveUp => RunStatus::Failed,
            InterruptionResolution::Cancel => RunStatus::Cancelled,
        };
        // Resolutions only make sense from Interrupted; reaching Running
        // from Queued here would silently skip the dispatch path.
        if self.status != RunStatus::Interrupted {
            return Err(RunDomainError::InvalidTransition {
                from: self.status,
                to: target,
                allowed: self.status.allowed_targets(),
            });
        }
        self.changes_to(target, None, clock)
    }

    /// Resolves the change set that abandons the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError`] when the run is already terminal.
    pub fn cancel_changes(&self, clock: &impl Clock) -> Result<RunChanges, RunDomainError> {
        self.changes_to(RunStatus::Cancelled, None, clock)
    }

    /// Validates the transition and the resulting contract state, then
    /// materializes the change set.
    fn changes_to(
        &self,
        target: RunStatus,
        next_retry_at: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Result<RunChanges, RunDomainError> {
        ensure_run_transition(self.status, target)?;
        validate_contract(target, self.idempotency_key.as_str(), next_retry_at)?;
        Ok(RunChanges {
            updated_at: clock.utc(),
            status: Some(target),
            next_retry_at: Some(next_retry_at),
        })
    }

    /// Applies a change set in place, bumping the version.
    ///
    /// In-memory equivalent of the store-side conditional update;
    /// validation has already happened by the time a change set exists.
    pub fn apply_changes(&mut self, changes: &RunChanges) {
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(next_retry_at) = changes.next_retry_at {
            self.next_retry_at = next_retry_at;
        }
        self.updated_at = changes.updated_at;
        self.version = self.version.next();
    }
}

/// Explicit change set for a version-matched run update.
///
/// `None` fields are left untouched; `Some(None)` clears the retry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunChanges {
    /// Timestamp the update is stamped with.
    pub updated_at: DateTime<Utc>,
    /// New lifecycle status, if changing.
    pub status: Option<RunStatus>,
    /// New retry time (`Some(None)` clears), if changing.
    pub next_retry_at: Option<Option<DateTime<Utc>>>,
}
