//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{DependencyRow, NewTaskRow, TaskRow, TaskUpdateRow},
    schema::{task_dependencies, tasks},
};
use crate::task::{
    domain::{
        AgentId, DependencyKind, PersistedTaskData, Priority, ProjectId, Task, TaskChanges,
        TaskDependency, TaskId, TaskStatus, Version,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    other => TaskRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_with_version(
        &self,
        id: TaskId,
        expected_version: Version,
        changes: TaskChanges,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let refreshed = connection.transaction::<Option<TaskRow>, TaskRepositoryError, _>(
                |conn| {
                    let affected = diesel::update(
                        tasks::table
                            .filter(tasks::id.eq(id.into_inner()))
                            .filter(tasks::version.eq(expected_version.value())),
                    )
                    .set(to_update_row(&changes, expected_version.next()))
                    .execute(conn)?;
                    // Zero rows touched means a concurrent writer moved the
                    // version; nothing to roll back, surface the typed
                    // conflict outcome instead.
                    if affected == 0 {
                        return Ok(None);
                    }
                    let row = tasks::table
                        .filter(tasks::id.eq(id.into_inner()))
                        .select(TaskRow::as_select())
                        .first::<TaskRow>(conn)?;
                    Ok(Some(row))
                },
            )?;
            refreshed.map_or_else(
                || {
                    Err(TaskRepositoryError::VersionConflict {
                        id,
                        expected_version,
                    })
                },
                row_to_task,
            )
        })
        .await
    }

    async fn list_by_status(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .filter(tasks::status.eq(status.as_str()))
                .order((tasks::priority.asc(), tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn add_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()> {
        let new_row = DependencyRow {
            task_id: dependency.task_id().into_inner(),
            depends_on: dependency.depends_on().into_inner(),
            kind: dependency.kind().as_str().to_owned(),
        };
        let task_id = dependency.task_id();

        self.run_blocking(move |connection| {
            diesel::insert_into(task_dependencies::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(task_id)
                    }
                    other => TaskRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_dependencies(
        &self,
        task_ids: &[TaskId],
    ) -> TaskRepositoryResult<Vec<TaskDependency>> {
        let ids: Vec<uuid::Uuid> = task_ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = task_dependencies::table
                .filter(task_dependencies::task_id.eq_any(&ids))
                .select(DependencyRow::as_select())
                .load::<DependencyRow>(connection)?;
            rows.into_iter().map(row_to_dependency).collect()
        })
        .await
    }

    async fn load_statuses(
        &self,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<HashMap<TaskId, TaskStatus>> {
        let raw_ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::id.eq_any(&raw_ids))
                .select((tasks::id, tasks::status))
                .load::<(uuid::Uuid, String)>(connection)?;
            rows.into_iter()
                .map(|(id, status)| {
                    let parsed = TaskStatus::try_from(status.as_str())
                        .map_err(TaskRepositoryError::persistence)?;
                    Ok((TaskId::from_uuid(id), parsed))
                })
                .collect()
        })
        .await
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().value(),
        assignee: task.assignee().map(AgentId::into_inner),
        parent_task: task.parent_task().map(TaskId::into_inner),
        version: task.version().value(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_update_row(changes: &TaskChanges, new_version: Version) -> TaskUpdateRow {
    TaskUpdateRow {
        status: changes.status.map(|status| status.as_str().to_owned()),
        priority: changes.priority.map(Priority::value),
        assignee: changes
            .assignee
            .map(|assignee| assignee.map(AgentId::into_inner)),
        description: changes.description.clone(),
        version: new_version.value(),
        updated_at: changes.updated_at,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title: row.title,
        description: row.description,
        status,
        priority: Priority::new(row.priority),
        assignee: row.assignee.map(AgentId::from_uuid),
        parent_task: row.parent_task.map(TaskId::from_uuid),
        version: Version::new(row.version),
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_dependency(row: DependencyRow) -> TaskRepositoryResult<TaskDependency> {
    let kind =
        DependencyKind::try_from(row.kind.as_str()).map_err(TaskRepositoryError::persistence)?;
    TaskDependency::new(
        TaskId::from_uuid(row.task_id),
        TaskId::from_uuid(row.depends_on),
        kind,
    )
    .map_err(TaskRepositoryError::persistence)
}
