//! Task aggregate root and change-set types.

use super::{
    AgentId, Priority, ProjectId, TaskCommand, TaskDomainError, TaskId, TaskStatus, Version,
    ensure_transition, resolve_command_target, validate_initial_status,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Project the task belongs to.
    pub project_id: ProjectId,
    /// Human-readable title; must be non-empty after trimming.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Scheduling priority; lower is more urgent.
    pub priority: Priority,
    /// Optional agent assignment.
    pub assignee: Option<AgentId>,
    /// Optional parent task, treated as an implicit dependency.
    pub parent_task: Option<TaskId>,
    /// Requested initial status; only [`TaskStatus::INITIAL`] is accepted.
    pub status: TaskStatus,
}

impl NewTask {
    /// Creates a parameter object with defaults for optional fields.
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
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: Priority,
    assignee: Option<AgentId>,
    parent_task: Option<TaskId>,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted project association.
    pub project_id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted assignee, if any.
    pub assignee: Option<AgentId>,
    /// Persisted parent task, if any.
    pub parent_task: Option<TaskId>,
    /// Persisted optimistic-lock version.
    pub version: Version,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the initial lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank or
    /// [`TaskDomainError::InvalidInitialStatus`] when the requested status
    /// is not the initial one.
    pub fn create(new_task: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        validate_initial_status(new_task.status)?;

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            project_id: new_task.project_id,
            title: title.to_owned(),
            description: new_task.description,
            status: new_task.status,
            priority: new_task.priority,
            assignee: new_task.assignee,
            parent_task: new_task.parent_task,
            version: Version::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            assignee: data.assignee,
            parent_task: data.parent_task,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the project association.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the assigned agent, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<AgentId> {
        self.assignee
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent_task(&self) -> Option<TaskId> {
        self.parent_task
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

    /// Resolves the change set a validated transition to `target` produces.
    ///
    /// The aggregate itself is not mutated; the caller persists the change
    /// set through the version-matched repository update and adopts the
    /// refreshed entity the store returns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the state machine
    /// rejects the move.
    pub fn transition_changes(
        &self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<TaskChanges, TaskDomainError> {
        ensure_transition(self.status, target)?;
        Ok(TaskChanges::at(clock.utc()).with_status(target))
    }

    /// Resolves the change set an externally-issued command produces.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCommand`] when the command is not
    /// defined for the current status, or
    /// [`TaskDomainError::InvalidTransition`] if the command table and the
    /// transition table ever disagree.
    pub fn command_changes(
        &self,
        command: TaskCommand,
        clock: &impl Clock,
    ) -> Result<TaskChanges, TaskDomainError> {
        let target = resolve_command_target(self.status, command)?;
        self.transition_changes(target, clock)
    }

    /// Applies a change set in place, bumping the version.
    ///
    /// This is the in-memory equivalent of the store-side conditional
    /// update; transition validation has already happened by the time a
    /// change set exists.
    pub fn apply_changes(&mut self, changes: &TaskChanges) {
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(ref assignee) = changes.assignee {
            self.assignee = *assignee;
        }
        if let Some(ref description) = changes.description {
            self.description = description.clone();
        }
        self.updated_at = changes.updated_at;
        self.version = self.version.next();
    }
}

/// Explicit change set for a version-matched task update.
///
/// `None` fields are left untouched by the update; `Some(None)` clears a
/// nullable field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskChanges {
    /// Timestamp the update is stamped with.
    pub updated_at: DateTime<Utc>,
    /// New lifecycle status, if changing.
    pub status: Option<TaskStatus>,
    /// New priority, if changing.
    pub priority: Option<Priority>,
    /// New assignee (`Some(None)` unassigns), if changing.
    pub assignee: Option<Option<AgentId>>,
    /// New description (`Some(None)` clears), if changing.
    pub description: Option<Option<String>>,
}

impl TaskChanges {
    /// Creates an empty change set stamped with `updated_at`.
    #[must_use]
    pub fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at,
            ..Self::default()
        }
    }

    /// Sets the target status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<AgentId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}
