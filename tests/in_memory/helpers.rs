//! Shared fixtures for in-memory integration tests.

use foreman::run::{adapters::memory::InMemoryRunRepository, services::RunLifecycleService};
use foreman::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Priority, ProjectId, Task, TaskStatus},
    services::{CreateTaskRequest, SchedulerService, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

pub type TaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;
pub type RunService = RunLifecycleService<InMemoryRunRepository, DefaultClock>;
pub type Scheduler = SchedulerService<InMemoryTaskRepository>;

/// Services wired over one shared pair of in-memory stores, the way a
/// deployment shares one database.
pub struct Harness {
    pub tasks: TaskService,
    pub runs: RunService,
    pub scheduler: Scheduler,
    pub project_id: ProjectId,
}

#[fixture]
pub fn harness() -> Harness {
    let task_repository = Arc::new(InMemoryTaskRepository::new());
    let run_repository = Arc::new(InMemoryRunRepository::new());
    let clock = Arc::new(DefaultClock);
    Harness {
        tasks: TaskLifecycleService::new(Arc::clone(&task_repository), Arc::clone(&clock)),
        runs: RunLifecycleService::new(run_repository, clock),
        scheduler: SchedulerService::new(task_repository),
        project_id: ProjectId::new(),
    }
}

impl Harness {
    /// Creates a task with the given title and priority.
    pub async fn create_task(&self, title: &str, priority: i32) -> Task {
        self.tasks
            .create_task(
                CreateTaskRequest::new(self.project_id, title)
                    .with_priority(Priority::new(priority)),
            )
            .await
            .expect("creation should succeed")
    }

    /// Walks a task all the way to `Done`.
    pub async fn complete_task(&self, task: &Task) -> Task {
        let running = self
            .tasks
            .transition(task, TaskStatus::Running)
            .await
            .expect("claim");
        let reviewed = self
            .tasks
            .transition(&running, TaskStatus::Review)
            .await
            .expect("finish");
        self.tasks
            .transition(&reviewed, TaskStatus::Done)
            .await
            .expect("accept")
    }
}
