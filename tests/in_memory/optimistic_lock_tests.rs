//! Concurrent claim races resolved at the store.

use super::helpers::{Harness, harness};
use foreman::task::domain::{TaskStatus, Version};
use foreman::task::ports::TaskRepositoryError;
use foreman::task::services::TaskLifecycleError;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn two_racing_claims_produce_exactly_one_winner(harness: Harness) {
    let task = harness.create_task("contested work", 10).await;

    let first_service = harness.tasks.clone();
    let second_service = harness.tasks.clone();
    let first_snapshot = task.clone();
    let second_snapshot = task.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move { first_service.claim(&first_snapshot).await }),
        tokio::spawn(async move { second_service.claim(&second_snapshot).await }),
    );
    let outcomes = [first.expect("join"), second.expect("join")];

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "exactly one claim must win");
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(TaskLifecycleError::Repository(
            TaskRepositoryError::VersionConflict { .. }
        ))
    )));

    let stored = harness
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::Running);
    assert_eq!(stored.version(), Version::INITIAL.next());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_losing_claimer_recovers_by_re_reading(harness: Harness) {
    let task = harness.create_task("recoverable race", 10).await;

    harness.tasks.claim(&task).await.expect("winner claims");
    let lost = harness.tasks.claim(&task).await;
    assert!(lost.is_err(), "stale snapshot must lose");

    let refreshed = harness
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(refreshed.status(), TaskStatus::Running);

    // With current state in hand the loser makes a legal move instead.
    let reviewed = harness
        .tasks
        .transition(&refreshed, TaskStatus::Review)
        .await
        .expect("transition from refreshed state");
    assert_eq!(reviewed.version(), Version::new(3));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_conflict_leaves_the_stored_entity_untouched(harness: Harness) {
    let task = harness.create_task("conflict probe", 10).await;
    let claimed = harness.tasks.claim(&task).await.expect("claim");

    let stale = harness.tasks.transition(&task, TaskStatus::Cancelled).await;
    assert!(stale.is_err());

    let stored = harness
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored, claimed);
}
