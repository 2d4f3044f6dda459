//! In-memory task repository with compare-and-swap semantics.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProjectId, Task, TaskChanges, TaskDependency, TaskId, TaskStatus, Version},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Mirrors the conditional-update discipline of the `PostgreSQL` adapter:
/// an update only lands when the stored version matches the expected one,
/// and the losing writer observes a typed conflict.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    dependencies: Vec<TaskDependency>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update_with_version(
        &self,
        id: TaskId,
        expected_version: Version,
        changes: TaskChanges,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let conflict = TaskRepositoryError::VersionConflict {
            id,
            expected_version,
        };
        let Some(task) = state.tasks.get_mut(&id) else {
            return Err(conflict);
        };
        if task.version() != expected_version {
            return Err(conflict);
        }
        task.apply_changes(&changes);
        Ok(task.clone())
    }

    async fn list_by_status(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id && task.status() == status)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.priority(), task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn add_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        for endpoint in [dependency.task_id(), dependency.depends_on()] {
            if !state.tasks.contains_key(&endpoint) {
                return Err(TaskRepositoryError::NotFound(endpoint));
            }
        }
        state.dependencies.push(*dependency);
        Ok(())
    }

    async fn list_dependencies(
        &self,
        task_ids: &[TaskId],
    ) -> TaskRepositoryResult<Vec<TaskDependency>> {
        let wanted: HashSet<TaskId> = task_ids.iter().copied().collect();
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .dependencies
            .iter()
            .filter(|edge| wanted.contains(&edge.task_id()))
            .copied()
            .collect())
    }

    async fn load_statuses(
        &self,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<HashMap<TaskId, TaskStatus>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.tasks.get(id).map(|task| (*id, task.status())))
            .collect())
    }
}
