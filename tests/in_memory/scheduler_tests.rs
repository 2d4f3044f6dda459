//! Dependency-aware selection and ordering.

use super::helpers::{Harness, harness};
use foreman::task::domain::{DependencyKind, Task, TaskId, TaskStatus};
use foreman::task::services::SchedulerError;
use rstest::rstest;

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(Task::id).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn independent_tasks_are_listed_in_priority_order(harness: Harness) {
    let low = harness.create_task("low urgency", 300).await;
    let high = harness.create_task("high urgency", 10).await;
    let mid = harness.create_task("mid urgency", 100).await;

    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");

    assert_eq!(ids(&schedulable), vec![high.id(), mid.id(), low.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_pending_dependency_gates_its_successor(harness: Harness) {
    let predecessor = harness.create_task("build the library", 10).await;
    let successor = harness.create_task("use the library", 10).await;
    harness
        .tasks
        .add_dependency(successor.id(), predecessor.id(), DependencyKind::default())
        .await
        .expect("edge");

    let before = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");
    assert_eq!(ids(&before), vec![predecessor.id()]);

    harness.complete_task(&predecessor).await;

    let after = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");
    assert_eq!(ids(&after), vec![successor.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_gated_task_is_skipped_without_disturbing_the_order(harness: Harness) {
    let foundation = harness.create_task("foundation work", 10).await;
    let gated = harness.create_task("work gated on the foundation", 10).await;
    harness
        .tasks
        .add_dependency(gated.id(), foundation.id(), DependencyKind::default())
        .await
        .expect("edge");
    let independent = harness.create_task("independent follow-up", 20).await;

    // One query: the gated task drops out, the rest keep their ordering.
    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");

    assert_eq!(ids(&schedulable), vec![foundation.id(), independent.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_dependency_must_be_done(harness: Harness) {
    let first = harness.create_task("first predecessor", 10).await;
    let second = harness.create_task("second predecessor", 10).await;
    let successor = harness.create_task("gated successor", 1).await;
    for predecessor in [&first, &second] {
        harness
            .tasks
            .add_dependency(successor.id(), predecessor.id(), DependencyKind::default())
            .await
            .expect("edge");
    }
    harness.complete_task(&first).await;

    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");

    assert!(!ids(&schedulable).contains(&successor.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_parent_task_is_an_implicit_dependency(harness: Harness) {
    let parent = harness.create_task("parent epic", 10).await;
    let child = harness
        .tasks
        .create_task(
            foreman::task::services::CreateTaskRequest::new(harness.project_id, "child work")
                .with_parent_task(parent.id()),
        )
        .await
        .expect("child creation");

    let before = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");
    assert!(!ids(&before).contains(&child.id()));

    harness.complete_task(&parent).await;

    let after = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");
    assert_eq!(ids(&after), vec![child.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_or_cancelled_dependencies_do_not_satisfy(harness: Harness) {
    let predecessor = harness.create_task("doomed predecessor", 10).await;
    let successor = harness.create_task("waiting successor", 10).await;
    harness
        .tasks
        .add_dependency(successor.id(), predecessor.id(), DependencyKind::default())
        .await
        .expect("edge");

    let running = harness.tasks.claim(&predecessor).await.expect("claim");
    harness
        .tasks
        .transition(&running, TaskStatus::Failed)
        .await
        .expect("fail");

    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 10)
        .await
        .expect("scheduler query");

    assert!(ids(&schedulable).is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_limit_caps_the_result_set(harness: Harness) {
    for index in 0..5 {
        harness.create_task(&format!("task {index}"), index).await;
    }

    let schedulable = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 2)
        .await
        .expect("scheduler query");

    assert_eq!(schedulable.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_zero_limit_is_rejected(harness: Harness) {
    let result = harness
        .scheduler
        .list_schedulable_tasks(harness.project_id, 0)
        .await;

    assert!(matches!(result, Err(SchedulerError::InvalidLimit)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pick_next_returns_the_most_urgent_eligible_task(harness: Harness) {
    harness.create_task("background chore", 500).await;
    let urgent = harness.create_task("urgent fix", 1).await;

    let picked = harness
        .scheduler
        .pick_next_schedulable_task(harness.project_id)
        .await
        .expect("scheduler query");

    assert_eq!(picked.map(|task| task.id()), Some(urgent.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_empty_project_yields_nothing(harness: Harness) {
    let picked = harness
        .scheduler
        .pick_next_schedulable_task(harness.project_id)
        .await
        .expect("scheduler query");

    assert_eq!(picked, None);
}
