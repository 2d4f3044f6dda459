//! Domain model for task lifecycle coordination.
//!
//! The task domain models the lifecycle state machine, externally-issued
//! commands, dependency edges, and the change sets consumed by the
//! version-matched repository update, keeping all infrastructure concerns
//! outside of the domain boundary.

mod command;
mod dependency;
mod error;
mod ids;
mod status;
mod task;

pub use command::{TaskCommand, resolve_command_target};
pub use dependency::{DependencyKind, TaskDependency};
pub use error::{
    ParseDependencyKindError, ParseTaskStatusError, TaskDomainError,
};
pub use ids::{AgentId, Priority, ProjectId, TaskId, Version};
pub use status::{TaskStatus, ensure_transition, validate_initial_status};
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges};
