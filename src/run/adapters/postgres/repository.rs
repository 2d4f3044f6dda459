//! `PostgreSQL` repository implementation for run storage.

use super::{
    models::{NewRunRow, RunRow, RunUpdateRow},
    schema::task_runs,
};
use crate::run::{
    domain::{IdempotencyKey, PersistedRunData, RunChanges, RunId, RunStatus, TaskRun},
    ports::{RunRepository, RunRepositoryError, RunRepositoryResult},
};
use crate::task::domain::{TaskId, Version};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by run adapters.
pub type RunPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed run repository.
#[derive(Debug, Clone)]
pub struct PostgresRunRepository {
    pool: RunPgPool,
}

impl From<DieselError> for RunRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresRunRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RunPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RunRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RunRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RunRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RunRepositoryError::persistence)?
    }
}

#[async_trait]
impl RunRepository for PostgresRunRepository {
    async fn store(&self, run: &TaskRun) -> RunRepositoryResult<()> {
        let run_id = run.id();
        let key = run.idempotency_key().clone();
        let new_row = to_new_row(run);

        self.run_blocking(move |connection| {
            diesel::insert_into(task_runs::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_idempotency_key_violation(info.as_ref()) =>
                    {
                        RunRepositoryError::DuplicateIdempotencyKey(key.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RunRepositoryError::DuplicateRun(run_id)
                    }
                    other => RunRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: RunId) -> RunRepositoryResult<Option<TaskRun>> {
        self.run_blocking(move |connection| {
            let row = task_runs::table
                .filter(task_runs::id.eq(id.into_inner()))
                .select(RunRow::as_select())
                .first::<RunRow>(connection)
                .optional()?;
            row.map(row_to_run).transpose()
        })
        .await
    }

    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> RunRepositoryResult<Option<TaskRun>> {
        let lookup = key.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = task_runs::table
                .filter(task_runs::idempotency_key.eq(&lookup))
                .select(RunRow::as_select())
                .first::<RunRow>(connection)
                .optional()?;
            row.map(row_to_run).transpose()
        })
        .await
    }

    async fn list_by_task(&self, task_id: TaskId) -> RunRepositoryResult<Vec<TaskRun>> {
        self.run_blocking(move |connection| {
            let rows = task_runs::table
                .filter(task_runs::task_id.eq(task_id.into_inner()))
                .order((task_runs::created_at.asc(), task_runs::id.asc()))
                .select(RunRow::as_select())
                .load::<RunRow>(connection)?;
            rows.into_iter().map(row_to_run).collect()
        })
        .await
    }

    async fn update_with_version(
        &self,
        id: RunId,
        expected_version: Version,
        changes: RunChanges,
    ) -> RunRepositoryResult<TaskRun> {
        self.run_blocking(move |connection| {
            let refreshed = connection.transaction::<Option<RunRow>, RunRepositoryError, _>(
                |conn| {
                    let affected = diesel::update(
                        task_runs::table
                            .filter(task_runs::id.eq(id.into_inner()))
                            .filter(task_runs::version.eq(expected_version.value())),
                    )
                    .set(to_update_row(&changes, expected_version.next()))
                    .execute(conn)?;
                    if affected == 0 {
                        return Ok(None);
                    }
                    let row = task_runs::table
                        .filter(task_runs::id.eq(id.into_inner()))
                        .select(RunRow::as_select())
                        .first::<RunRow>(conn)?;
                    Ok(Some(row))
                },
            )?;
            refreshed.map_or_else(
                || {
                    Err(RunRepositoryError::VersionConflict {
                        id,
                        expected_version,
                    })
                },
                row_to_run,
            )
        })
        .await
    }
}

fn to_new_row(run: &TaskRun) -> NewRunRow {
    NewRunRow {
        id: run.id().into_inner(),
        task_id: run.task_id().into_inner(),
        status: run.status().as_str().to_owned(),
        idempotency_key: run.idempotency_key().as_str().to_owned(),
        next_retry_at: run.next_retry_at(),
        version: run.version().value(),
        created_at: run.created_at(),
        updated_at: run.updated_at(),
    }
}

fn to_update_row(changes: &RunChanges, new_version: Version) -> RunUpdateRow {
    RunUpdateRow {
        status: changes.status.map(|status| status.as_str().to_owned()),
        next_retry_at: changes.next_retry_at,
        version: new_version.value(),
        updated_at: changes.updated_at,
    }
}

fn row_to_run(row: RunRow) -> RunRepositoryResult<TaskRun> {
    let status =
        RunStatus::try_from(row.status.as_str()).map_err(RunRepositoryError::persistence)?;
    let idempotency_key =
        IdempotencyKey::new(row.idempotency_key).map_err(RunRepositoryError::persistence)?;
    let data = PersistedRunData {
        id: RunId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        status,
        idempotency_key,
        next_retry_at: row.next_retry_at,
        version: Version::new(row.version),
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(TaskRun::from_persisted(data))
}

fn is_idempotency_key_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_task_runs_idempotency_key_unique")
}
