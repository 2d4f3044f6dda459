//! Application services for run execution tracking.

mod lifecycle;

pub use lifecycle::{RunLifecycleError, RunLifecycleResult, RunLifecycleService};
