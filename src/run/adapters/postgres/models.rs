//! Diesel row models for run persistence.

use super::schema::task_runs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for run records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RunRow {
    /// Run identifier.
    pub id: uuid::Uuid,
    /// Task being executed.
    pub task_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Idempotency key.
    pub idempotency_key: String,
    /// Retry time, if any.
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Optimistic-lock version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for run records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_runs)]
pub struct NewRunRow {
    /// Run identifier.
    pub id: uuid::Uuid,
    /// Task being executed.
    pub task_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Idempotency key.
    pub idempotency_key: String,
    /// Retry time, if any.
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Optimistic-lock version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Change set applied by the version-matched update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task_runs)]
pub struct RunUpdateRow {
    /// New lifecycle status, if changing.
    pub status: Option<String>,
    /// New retry time, if changing (`Some(None)` clears).
    pub next_retry_at: Option<Option<DateTime<Utc>>>,
    /// Version after the update.
    pub version: i64,
    /// Timestamp the update is stamped with.
    pub updated_at: DateTime<Utc>,
}
