//! Deterministic failure drills: an executor loop driven through injected
//! faults must recover through the same paths organic failures take.

use super::helpers::{Harness, harness};
use foreman::fault::{FaultInjector, FaultKind, FaultRule, InjectedFault};
use foreman::run::domain::{InterruptionResolution, RunOutcome, RunStatus, TaskRun};
use foreman::task::domain::Task;
use chrono::{Duration, Utc};
use rstest::rstest;

const EXECUTE_POINT: &str = "executor.execute";
const MAX_ATTEMPTS: u64 = 5;

/// Maps an injected fault to the outcome an executor would report for it.
fn outcome_for(fault: &InjectedFault) -> RunOutcome {
    match fault.kind {
        FaultKind::Timeout | FaultKind::Transient | FaultKind::LockContention => {
            RunOutcome::Failed { next_retry_at: Some(Utc::now() + Duration::seconds(30)) }
        }
        FaultKind::ProcessRestart => RunOutcome::Interrupted,
        FaultKind::Permission => RunOutcome::Failed { next_retry_at: None },
    }
}

/// Drives one task's attempt loop to a terminal run, consulting the
/// injector where real work would happen.
async fn execute_until_terminal(
    harness: &Harness,
    injector: &FaultInjector,
    task: &Task,
) -> TaskRun {
    let mut attempt = 0;
    let mut run = harness
        .runs
        .dispatch(task.id(), format!("{}-attempt", task.id()))
        .await
        .expect("dispatch");
    loop {
        attempt += 1;
        assert!(attempt <= MAX_ATTEMPTS, "drill failed to converge");

        run = match run.status() {
            RunStatus::Queued | RunStatus::RetryScheduled => {
                harness.runs.start(&run).await.expect("start")
            }
            RunStatus::Interrupted => harness
                .runs
                .resolve_interrupted(&run, InterruptionResolution::Resume)
                .await
                .expect("resume after restart"),
            _ => run,
        };

        let outcome = match injector.inject(EXECUTE_POINT) {
            Ok(()) => RunOutcome::Succeeded,
            Err(fault) => outcome_for(&fault),
        };
        run = harness
            .runs
            .record_outcome(&run, outcome)
            .await
            .expect("outcome");

        if run.status().is_terminal() {
            return run;
        }
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_transient_fault_is_absorbed_by_one_retry(harness: Harness) {
    let injector = FaultInjector::new();
    injector.arm(FaultRule::once(FaultKind::Transient, EXECUTE_POINT, 1));
    let task = harness.create_task("transient-fault drill", 10).await;

    let run = execute_until_terminal(&harness, &injector, &task).await;

    assert_eq!(run.status(), RunStatus::Succeeded);
    assert_eq!(injector.invocations(EXECUTE_POINT), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consecutive_timeouts_cost_one_retry_each(harness: Harness) {
    let injector = FaultInjector::new();
    injector.arm(FaultRule::new(FaultKind::Timeout, EXECUTE_POINT, 1, 3));
    let task = harness.create_task("timeout drill", 10).await;

    let run = execute_until_terminal(&harness, &injector, &task).await;

    assert_eq!(run.status(), RunStatus::Succeeded);
    assert_eq!(injector.invocations(EXECUTE_POINT), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_process_restart_detours_through_interrupted(harness: Harness) {
    let injector = FaultInjector::new();
    injector.arm(FaultRule::once(FaultKind::ProcessRestart, EXECUTE_POINT, 1));
    let task = harness.create_task("restart drill", 10).await;

    let run = execute_until_terminal(&harness, &injector, &task).await;

    assert_eq!(run.status(), RunStatus::Succeeded);
    let history = harness.runs.list_by_task(task.id()).await.expect("listing");
    assert_eq!(history.len(), 1, "the interrupted attempt is resumed, not replaced");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_permission_fault_is_not_retried(harness: Harness) {
    let injector = FaultInjector::new();
    injector.arm(FaultRule::once(FaultKind::Permission, EXECUTE_POINT, 1));
    let task = harness.create_task("permission drill", 10).await;

    let run = execute_until_terminal(&harness, &injector, &task).await;

    assert_eq!(run.status(), RunStatus::Failed);
    assert_eq!(injector.invocations(EXECUTE_POINT), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn drills_on_separate_injectors_do_not_interfere(harness: Harness) {
    let faulty = FaultInjector::new();
    faulty.arm(FaultRule::once(FaultKind::Transient, EXECUTE_POINT, 1));
    let clean = FaultInjector::new();

    let first = harness.create_task("faulty drill", 10).await;
    let second = harness.create_task("clean drill", 10).await;

    let faulted_run = execute_until_terminal(&harness, &faulty, &first).await;
    let clean_run = execute_until_terminal(&harness, &clean, &second).await;

    assert_eq!(faulted_run.status(), RunStatus::Succeeded);
    assert_eq!(clean_run.status(), RunStatus::Succeeded);
    assert_eq!(clean.invocations(EXECUTE_POINT), 1);
}
