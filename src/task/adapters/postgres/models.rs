//! Diesel row models for task persistence.

use super::schema::{task_dependencies, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Project association.
    pub project_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Scheduling priority.
    pub priority: i32,
    /// Optional assignee.
    pub assignee: Option<uuid::Uuid>,
    /// Optional parent task.
    pub parent_task: Option<uuid::Uuid>,
    /// Optimistic-lock version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Project association.
    pub project_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Scheduling priority.
    pub priority: i32,
    /// Optional assignee.
    pub assignee: Option<uuid::Uuid>,
    /// Optional parent task.
    pub parent_task: Option<uuid::Uuid>,
    /// Optimistic-lock version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Change set applied by the version-matched update.
///
/// `None` fields are skipped; `Some(None)` writes NULL. The version and
/// timestamp are always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskUpdateRow {
    /// New lifecycle status, if changing.
    pub status: Option<String>,
    /// New priority, if changing.
    pub priority: Option<i32>,
    /// New assignee, if changing (`Some(None)` unassigns).
    pub assignee: Option<Option<uuid::Uuid>>,
    /// New description, if changing (`Some(None)` clears).
    pub description: Option<Option<String>>,
    /// Version after the update.
    pub version: i64,
    /// Timestamp the update is stamped with.
    pub updated_at: DateTime<Utc>,
}

/// Row model for dependency edges.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyRow {
    /// The waiting task.
    pub task_id: uuid::Uuid,
    /// The task being waited on.
    pub depends_on: uuid::Uuid,
    /// Relationship kind.
    pub kind: String,
}
