//! Deterministic failure injection for resilience drills.
//!
//! The injector interposes at named instrumentation points inside
//! executor/orchestrator code under test and raises a category-specific
//! error when a configured rule matches the point and its Nth invocation.
//! It has no production code path: injected faults surface as ordinary
//! errors and must be handled by the same recovery paths used for organic
//! failures.
//!
//! Injectors are explicitly constructed and shared by cloning; there is no
//! global instance, so rules cannot leak across tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Category of fault an injection rule raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The operation timed out.
    Timeout,
    /// A transient error that is expected to clear on retry.
    Transient,
    /// The executing process restarted mid-operation.
    ProcessRestart,
    /// A resource lock was contended.
    LockContention,
    /// The operation was denied.
    Permission,
}

impl FaultKind {
    /// Returns a short human-readable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transient => "transient",
            Self::ProcessRestart => "process_restart",
            Self::LockContention => "lock_contention",
            Self::Permission => "permission",
        }
    }
}

/// Error raised by a matching injection rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("injected {} fault at {point} (invocation {invocation})", kind.as_str())]
pub struct InjectedFault {
    /// Fault category.
    pub kind: FaultKind,
    /// Instrumentation point the fault fired at.
    pub point: String,
    /// Invocation number the fault fired on.
    pub invocation: u64,
}

/// A single injection rule.
///
/// The rule arms at the `at_invocation`th call to its point (1-indexed)
/// and fires on `repeat` consecutive matching calls before becoming
/// inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRule {
    kind: FaultKind,
    point: String,
    at_invocation: u64,
    repeat: u32,
}

impl FaultRule {
    /// Creates a rule firing `repeat` times starting at `at_invocation`.
    #[must_use]
    pub fn new(kind: FaultKind, point: impl Into<String>, at_invocation: u64, repeat: u32) -> Self {
        Self {
            kind,
            point: point.into(),
            at_invocation,
            repeat,
        }
    }

    /// Convenience for the common fire-once rule.
    #[must_use]
    pub fn once(kind: FaultKind, point: impl Into<String>, at_invocation: u64) -> Self {
        Self::new(kind, point, at_invocation, 1)
    }
}

#[derive(Debug)]
struct ArmedRule {
    rule: FaultRule,
    remaining: u32,
}

#[derive(Debug, Default)]
struct InjectorState {
    rules: Vec<ArmedRule>,
    invocations: HashMap<String, u64>,
}

/// Deterministic fault injector.
///
/// Clones share state, so the injector handed to an executor under test
/// and the one held by the test observe the same counters and rules.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    state: Arc<Mutex<InjectorState>>,
}

impl FaultInjector {
    /// Creates an injector with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms an injection rule.
    pub fn arm(&self, rule: FaultRule) {
        let mut state = self.lock();
        let remaining = rule.repeat;
        state.rules.push(ArmedRule { rule, remaining });
    }

    /// Records an invocation of `point`, raising a fault when an armed
    /// rule matches.
    ///
    /// The per-point invocation counter increments on every call
    /// regardless of whether an injection fires.
    ///
    /// # Errors
    ///
    /// Returns [`InjectedFault`] when a matching rule fires; each firing
    /// consumes one of the rule's repeats.
    pub fn inject(&self, point: &str) -> Result<(), InjectedFault> {
        let mut state = self.lock();
        let invocation = {
            let counter = state.invocations.entry(point.to_owned()).or_insert(0);
            *counter += 1;
            *counter
        };
        for armed in &mut state.rules {
            if armed.remaining > 0
                && armed.rule.point == point
                && invocation >= armed.rule.at_invocation
            {
                armed.remaining -= 1;
                return Err(InjectedFault {
                    kind: armed.rule.kind,
                    point: point.to_owned(),
                    invocation,
                });
            }
        }
        Ok(())
    }

    /// Returns how often `point` has been invoked.
    #[must_use]
    pub fn invocations(&self, point: &str) -> u64 {
        let state = self.lock();
        state.invocations.get(point).copied().unwrap_or(0)
    }

    /// Removes all rules and counters.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.rules.clear();
        state.invocations.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InjectorState> {
        // A panicked holder cannot leave the rule list half-updated in a
        // way that matters; recover the data instead of propagating.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
