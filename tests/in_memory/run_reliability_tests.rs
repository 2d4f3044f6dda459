//! Idempotent dispatch and retry drills across task and run services.

use super::helpers::{Harness, harness};
use foreman::run::domain::{
    IdempotencyKey, InterruptionResolution, RunOutcome, RunStatus, TaskRun,
};
use foreman::run::ports::RunRepositoryError;
use foreman::run::services::RunLifecycleError;
use foreman::task::domain::TaskStatus;
use chrono::{Duration, Utc};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_redelivered_dispatch_is_deduplicated_by_key(harness: Harness) {
    let task = harness.create_task("at-most-once work", 10).await;

    let original = harness
        .runs
        .dispatch(task.id(), "task-1-attempt-1")
        .await
        .expect("first dispatch");
    let redelivered = harness.runs.dispatch(task.id(), "task-1-attempt-1").await;

    assert!(matches!(
        redelivered,
        Err(RunLifecycleError::Repository(
            RunRepositoryError::DuplicateIdempotencyKey(_)
        ))
    ));

    // The caller recovers the original attempt instead of duplicating it.
    let key = IdempotencyKey::new("task-1-attempt-1").expect("valid key");
    let recovered = harness
        .runs
        .find_by_idempotency_key(&key)
        .await
        .expect("lookup");
    assert_eq!(recovered, Some(original));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_retry_drill_recovers_the_task_to_done(harness: Harness) {
    let task = harness.create_task("flaky but recoverable", 10).await;
    let claimed = harness.tasks.claim(&task).await.expect("claim");

    // First attempt fails retryably.
    let run = harness
        .runs
        .dispatch(task.id(), "attempt-1")
        .await
        .expect("dispatch");
    let running = harness.runs.start(&run).await.expect("start");
    let retry_at = Utc::now() + Duration::minutes(1);
    let scheduled = harness
        .runs
        .record_outcome(&running, RunOutcome::Failed { next_retry_at: Some(retry_at) })
        .await
        .expect("retryable failure");
    assert_eq!(scheduled.status(), RunStatus::RetryScheduled);

    // The retry succeeds and the task finishes its lifecycle.
    let resumed = harness.runs.start(&scheduled).await.expect("resume");
    let finished = harness
        .runs
        .record_outcome(&resumed, RunOutcome::Succeeded)
        .await
        .expect("success");
    assert_eq!(finished.status(), RunStatus::Succeeded);
    assert_eq!(finished.next_retry_at(), None);

    let reviewed = harness
        .tasks
        .transition(&claimed, TaskStatus::Review)
        .await
        .expect("finish");
    let done = harness
        .tasks
        .transition(&reviewed, TaskStatus::Done)
        .await
        .expect("accept");
    assert_eq!(done.status(), TaskStatus::Done);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_process_restart_is_resolved_without_losing_the_attempt(harness: Harness) {
    let task = harness.create_task("restart survivor", 10).await;
    let run = harness
        .runs
        .dispatch(task.id(), "attempt-1")
        .await
        .expect("dispatch");
    let running = harness.runs.start(&run).await.expect("start");

    let interrupted = harness
        .runs
        .record_outcome(&running, RunOutcome::Interrupted)
        .await
        .expect("process restart");
    assert_eq!(interrupted.status(), RunStatus::Interrupted);

    let resumed = harness
        .runs
        .resolve_interrupted(&interrupted, InterruptionResolution::Resume)
        .await
        .expect("resume");
    let finished = harness
        .runs
        .record_outcome(&resumed, RunOutcome::Succeeded)
        .await
        .expect("success");
    assert_eq!(finished.status(), RunStatus::Succeeded);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn giving_up_on_an_interrupted_run_is_terminal(harness: Harness) {
    let task = harness.create_task("unsalvageable work", 10).await;
    let run = harness
        .runs
        .dispatch(task.id(), "attempt-1")
        .await
        .expect("dispatch");
    let running = harness.runs.start(&run).await.expect("start");
    let interrupted = harness
        .runs
        .record_outcome(&running, RunOutcome::Interrupted)
        .await
        .expect("process restart");

    let failed = harness
        .runs
        .resolve_interrupted(&interrupted, InterruptionResolution::GiveUp)
        .await
        .expect("give up");

    assert_eq!(failed.status(), RunStatus::Failed);
    assert!(harness.runs.start(&failed).await.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attempt_history_is_preserved_per_task(harness: Harness) {
    let task = harness.create_task("thrice-attempted work", 10).await;
    for attempt in 1..=3 {
        let run = harness
            .runs
            .dispatch(task.id(), format!("attempt-{attempt}"))
            .await
            .expect("dispatch");
        let running = harness.runs.start(&run).await.expect("start");
        let outcome = if attempt < 3 {
            RunOutcome::Failed { next_retry_at: None }
        } else {
            RunOutcome::Succeeded
        };
        harness
            .runs
            .record_outcome(&running, outcome)
            .await
            .expect("outcome");
    }

    let history = harness.runs.list_by_task(task.id()).await.expect("listing");

    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().map(TaskRun::status).collect::<Vec<_>>(),
        vec![RunStatus::Failed, RunStatus::Failed, RunStatus::Succeeded]
    );
}
