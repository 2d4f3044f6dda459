//! Service layer for task creation, claiming, and command application.

use crate::task::{
    domain::{
        AgentId, DependencyKind, NewTask, Priority, ProjectId, Task, TaskCommand, TaskDependency,
        TaskDomainError, TaskId, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    priority: Priority,
    assignee: Option<AgentId>,
    parent_task: Option<TaskId>,
    status: TaskStatus,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            priority: Priority::DEFAULT,
            assignee: None,
            parent_task: None,
            status: TaskStatus::INITIAL,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: AgentId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the parent task.
    #[must_use]
    pub const fn with_parent_task(mut self, parent: TaskId) -> Self {
        self.parent_task = Some(parent);
        self
    }

    /// Requests an explicit initial status.
    ///
    /// Anything other than [`TaskStatus::INITIAL`] is rejected at creation.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a new task in the initial lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when input validation fails or the
    /// repository rejects persistence.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let new_task = NewTask {
            project_id: request.project_id,
            title: request.title,
            description: request.description,
            priority: request.priority,
            assignee: request.assignee,
            parent_task: request.parent_task,
            status: request.status,
        };
        let task = Task::create(new_task, &*self.clock)?;
        self.repository.store(&task).await?;
        tracing::info!(task_id = %task.id(), project_id = %task.project_id(), "task created");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Declares that `task_id` waits for `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a self-dependency or
    /// [`TaskLifecycleError::Repository`] when either endpoint is missing.
    pub async fn add_dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
        kind: DependencyKind,
    ) -> TaskLifecycleResult<()> {
        let dependency = TaskDependency::new(task_id, depends_on, kind)?;
        self.repository.add_dependency(&dependency).await?;
        Ok(())
    }

    /// Claims a task for execution, moving it from `Todo` to `Running`
    /// through the version-matched update.
    ///
    /// Two callers racing on the same scheduler result will see exactly one
    /// claim succeed; the loser observes a version conflict and must go
    /// back to the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the transition is not
    /// legal and [`TaskLifecycleError::Repository`] with
    /// [`TaskRepositoryError::VersionConflict`] when a concurrent writer
    /// won the race.
    pub async fn claim(&self, task: &Task) -> TaskLifecycleResult<Task> {
        self.transition(task, TaskStatus::Running).await
    }

    /// Moves a task to `target` after state-machine validation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the state machine
    /// rejects the move or [`TaskLifecycleError::Repository`] when the
    /// conditional write fails.
    pub async fn transition(&self, task: &Task, target: TaskStatus) -> TaskLifecycleResult<Task> {
        let changes = task.transition_changes(target, &*self.clock)?;
        let updated = self
            .repository
            .update_with_version(task.id(), task.version(), changes)
            .await
            .inspect_err(|err| {
                if matches!(err, TaskRepositoryError::VersionConflict { .. }) {
                    tracing::warn!(task_id = %task.id(), %target, "task claim lost the race");
                }
            })?;
        tracing::debug!(
            task_id = %updated.id(),
            from = %task.status(),
            to = %updated.status(),
            version = %updated.version(),
            "task transition applied"
        );
        Ok(updated)
    }

    /// Applies an externally-issued command to a task.
    ///
    /// The task is re-read so the command is resolved against current
    /// state, then written through the version-matched update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] with
    /// [`TaskRepositoryError::NotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Domain`] when the command is undefined for the
    /// current status, and a version conflict when a concurrent writer got
    /// there first.
    pub async fn apply_command(
        &self,
        id: TaskId,
        command: TaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskRepositoryError::NotFound(id))?;
        let changes = task.command_changes(command, &*self.clock)?;
        let updated = self
            .repository
            .update_with_version(task.id(), task.version(), changes)
            .await?;
        tracing::info!(
            task_id = %updated.id(),
            %command,
            to = %updated.status(),
            "task command applied"
        );
        Ok(updated)
    }
}
