//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records with lifecycle status and optimistic-lock version.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Project the task belongs to.
        project_id -> Uuid,
        /// Human-readable title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional longer description.
        description -> Nullable<Text>,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Scheduling priority; lower is more urgent.
        priority -> Int4,
        /// Optional agent assignment.
        assignee -> Nullable<Uuid>,
        /// Optional parent task reference.
        parent_task -> Nullable<Uuid>,
        /// Optimistic-lock version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed dependency edges between tasks.
    task_dependencies (task_id, depends_on) {
        /// The waiting task.
        task_id -> Uuid,
        /// The task being waited on.
        depends_on -> Uuid,
        /// Relationship kind.
        #[max_length = 50]
        kind -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, task_dependencies);
