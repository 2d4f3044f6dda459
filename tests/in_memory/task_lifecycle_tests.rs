//! End-to-end task lifecycle and command flows.

use super::helpers::{Harness, harness};
use foreman::task::domain::{TaskCommand, TaskStatus, Version};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn happy_path_walks_todo_to_done(harness: Harness) {
    let task = harness.create_task("ship the feature", 10).await;

    let done = harness.complete_task(&task).await;

    assert_eq!(done.status(), TaskStatus::Done);
    assert_eq!(done.version(), Version::new(4));
    let stored = harness
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored, done);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_rejection_sends_the_task_back_to_running(harness: Harness) {
    let task = harness.create_task("needs another pass", 10).await;
    let running = harness
        .tasks
        .claim(&task)
        .await
        .expect("claim");
    let reviewed = harness
        .tasks
        .transition(&running, TaskStatus::Review)
        .await
        .expect("finish");

    let reworking = harness
        .tasks
        .transition(&reviewed, TaskStatus::Running)
        .await
        .expect("review rejection");

    assert_eq!(reworking.status(), TaskStatus::Running);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn done_tasks_accept_no_further_commands(harness: Harness) {
    let task = harness.create_task("finished work", 10).await;
    let done = harness.complete_task(&task).await;

    for command in [
        TaskCommand::Pause,
        TaskCommand::Resume,
        TaskCommand::Retry,
        TaskCommand::Cancel,
    ] {
        let result = harness.tasks.apply_command(done.id(), command).await;
        assert!(result.is_err(), "expected {command} to be rejected on a done task");
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_task_can_be_retried_and_rescheduled(harness: Harness) {
    let task = harness.create_task("flaky work", 10).await;
    let running = harness.tasks.claim(&task).await.expect("claim");
    let failed = harness
        .tasks
        .transition(&running, TaskStatus::Failed)
        .await
        .expect("give up");

    let retried = harness
        .tasks
        .apply_command(failed.id(), TaskCommand::Retry)
        .await
        .expect("retry a failed task");

    assert_eq!(retried.status(), TaskStatus::Todo);
    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");
    assert!(schedulable.iter().any(|t| t.id() == task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paused_task_resumes_where_it_left_off(harness: Harness) {
    let task = harness.create_task("pausable work", 10).await;
    harness.tasks.claim(&task).await.expect("claim");

    let paused = harness
        .tasks
        .apply_command(task.id(), TaskCommand::Pause)
        .await
        .expect("pause");
    assert_eq!(paused.status(), TaskStatus::Blocked);

    let resumed = harness
        .tasks
        .apply_command(task.id(), TaskCommand::Resume)
        .await
        .expect("resume");
    assert_eq!(resumed.status(), TaskStatus::Running);
}
