//! Diesel schema for run persistence.

diesel::table! {
    /// Execution attempts with reliability-contract columns.
    task_runs (id) {
        /// Run identifier.
        id -> Uuid,
        /// Task being executed.
        task_id -> Uuid,
        /// Run lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// At-most-once execution token; unique across all runs.
        #[max_length = 255]
        idempotency_key -> Varchar,
        /// Retry time; non-null exactly for retry-scheduled runs.
        next_retry_at -> Nullable<Timestamptz>,
        /// Optimistic-lock version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
