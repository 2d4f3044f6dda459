//! Application services for task lifecycle coordination.

mod lifecycle;
mod scheduler;

pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use scheduler::{SchedulerError, SchedulerResult, SchedulerService};
