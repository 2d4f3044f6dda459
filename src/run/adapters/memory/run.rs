//! In-memory run repository with compare-and-swap semantics.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::run::{
    domain::{IdempotencyKey, RunChanges, RunId, TaskRun},
    ports::{RunRepository, RunRepositoryError, RunRepositoryResult},
};
use crate::task::domain::{TaskId, Version};

/// Thread-safe in-memory run repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunRepository {
    state: Arc<RwLock<InMemoryRunState>>,
}

#[derive(Debug, Default)]
struct InMemoryRunState {
    runs: HashMap<RunId, TaskRun>,
    key_index: HashMap<String, RunId>,
}

impl InMemoryRunRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> RunRepositoryError {
    RunRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn store(&self, run: &TaskRun) -> RunRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.runs.contains_key(&run.id()) {
            return Err(RunRepositoryError::DuplicateRun(run.id()));
        }
        let key = run.idempotency_key().clone();
        if state.key_index.contains_key(key.as_str()) {
            return Err(RunRepositoryError::DuplicateIdempotencyKey(key));
        }
        state.key_index.insert(key.into_inner(), run.id());
        state.runs.insert(run.id(), run.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RunId) -> RunRepositoryResult<Option<TaskRun>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.runs.get(&id).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> RunRepositoryResult<Option<TaskRun>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let run = state
            .key_index
            .get(key.as_str())
            .and_then(|run_id| state.runs.get(run_id))
            .cloned();
        Ok(run)
    }

    async fn list_by_task(&self, task_id: TaskId) -> RunRepositoryResult<Vec<TaskRun>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut runs: Vec<TaskRun> = state
            .runs
            .values()
            .filter(|run| run.task_id() == task_id)
            .cloned()
            .collect();
        runs.sort_by_key(|run| (run.created_at(), run.id()));
        Ok(runs)
    }

    async fn update_with_version(
        &self,
        id: RunId,
        expected_version: Version,
        changes: RunChanges,
    ) -> RunRepositoryResult<TaskRun> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let conflict = RunRepositoryError::VersionConflict {
            id,
            expected_version,
        };
        let Some(run) = state.runs.get_mut(&id) else {
            return Err(conflict);
        };
        if run.version() != expected_version {
            return Err(conflict);
        }
        run.apply_changes(&changes);
        Ok(run.clone())
    }
}
