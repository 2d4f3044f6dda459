//! Dependency-aware task selection.
//!
//! The scheduler is read-only and advisory: it proposes tasks whose
//! dependency closure is satisfied, and the actual claim happens through
//! the version-matched repository update. Two callers racing on the same
//! proposal resolve the race at the store, not here.

use crate::task::{
    domain::{ProjectId, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by scheduler queries.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The requested result limit was zero.
    #[error("scheduler limit must be positive")]
    InvalidLimit,
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Dependency-aware task scheduler.
#[derive(Clone)]
pub struct SchedulerService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> SchedulerService<R>
where
    R: TaskRepository,
{
    /// Creates a new scheduler over a task repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns up to `limit` tasks in `Todo` whose full dependency set
    /// (explicit edges plus the implicit parent-task edge) is entirely
    /// `Done`, in `(priority asc, created_at asc, id asc)` order.
    ///
    /// Tasks with no dependencies are always eligible. The query costs the
    /// candidate fetch plus exactly two bulk reads, regardless of how many
    /// candidates there are.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidLimit`] when `limit` is zero and
    /// [`SchedulerError::Repository`] when a bulk read fails.
    pub async fn list_schedulable_tasks(
        &self,
        project_id: ProjectId,
        limit: usize,
    ) -> SchedulerResult<Vec<Task>> {
        if limit == 0 {
            return Err(SchedulerError::InvalidLimit);
        }

        let candidates = self
            .repository
            .list_by_status(project_id, TaskStatus::Todo)
            .await?;
        let candidate_ids: Vec<TaskId> = candidates.iter().map(Task::id).collect();

        let dependency_map = self.load_dependency_map(&candidates, &candidate_ids).await?;

        let distinct_deps: Vec<TaskId> = dependency_map
            .values()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let statuses = self.repository.load_statuses(&distinct_deps).await?;

        let mut eligible = Vec::with_capacity(limit.min(candidates.len()));
        for task in candidates {
            if eligible.len() == limit {
                break;
            }
            if dependencies_satisfied(&dependency_map, &statuses, task.id()) {
                eligible.push(task);
            }
        }
        tracing::debug!(
            %project_id,
            limit,
            selected = eligible.len(),
            "schedulable tasks selected"
        );
        Ok(eligible)
    }

    /// Returns the single highest-priority eligible task, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Repository`] when a bulk read fails.
    pub async fn pick_next_schedulable_task(
        &self,
        project_id: ProjectId,
    ) -> SchedulerResult<Option<Task>> {
        let mut tasks = self.list_schedulable_tasks(project_id, 1).await?;
        Ok(tasks.pop())
    }

    /// Bulk-loads explicit dependency edges for the candidates and augments
    /// them with each candidate's implicit parent-task edge.
    async fn load_dependency_map(
        &self,
        candidates: &[Task],
        candidate_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, Vec<TaskId>>, TaskRepositoryError> {
        let edges = self.repository.list_dependencies(candidate_ids).await?;
        let mut map: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for edge in edges {
            map.entry(edge.task_id()).or_default().push(edge.depends_on());
        }
        for task in candidates {
            if let Some(parent) = task.parent_task() {
                map.entry(task.id()).or_default().push(parent);
            }
        }
        Ok(map)
    }
}

/// A candidate is eligible when every dependency status resolves to one
/// that satisfies the closure; an edge pointing at an unknown task counts
/// as unsatisfied.
fn dependencies_satisfied(
    dependency_map: &HashMap<TaskId, Vec<TaskId>>,
    statuses: &HashMap<TaskId, TaskStatus>,
    task_id: TaskId,
) -> bool {
    dependency_map.get(&task_id).is_none_or(|deps| {
        deps.iter().all(|dep| {
            statuses
                .get(dep)
                .is_some_and(|status| status.satisfies_dependency())
        })
    })
}
