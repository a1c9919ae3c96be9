//! Atomic phase cell and per-operation guards.

use super::phase::LifecyclePhase;
use crate::error::{StoreError, StoreResult};
use log::{debug, error, info};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

/// Declares the phases in which one operation is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    allowed: &'static [LifecyclePhase],
}

impl Guard {
    pub const fn by(allowed: &'static [LifecyclePhase]) -> Self {
        Self { allowed }
    }

    pub fn permits(self, phase: LifecyclePhase) -> bool {
        self.allowed.contains(&phase)
    }
}

/// Guard for operations that read or write entities.
pub const STARTED: Guard = Guard::by(&[LifecyclePhase::Started]);

/// Phase cell shared by a component's operations and its start/stop sequence.
///
/// The phase is a single atomic byte. A guard check is one atomic load, so an
/// operation that loaded `Started` before a concurrent stop may still finish,
/// but no check succeeds once `Stopping` has been stored.
#[derive(Debug)]
pub struct StateGuard {
    component: &'static str,
    phase: AtomicU8,
}

impl StateGuard {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            phase: AtomicU8::new(LifecyclePhase::Created as u8),
        }
    }

    pub fn current(&self) -> LifecyclePhase {
        LifecyclePhase::from_repr(self.phase.load(Ordering::Acquire))
    }

    /// Moves to `next` and returns the phase that was replaced.
    ///
    /// # Errors
    /// - `IllegalTransition` when `next` is not a successor of the current
    ///   phase. The phase is left unchanged.
    pub fn transition_to(&self, next: LifecyclePhase) -> StoreResult<LifecyclePhase> {
        let mut observed = self.phase.load(Ordering::Acquire);
        loop {
            let from = LifecyclePhase::from_repr(observed);
            if !from.can_transition_to(next) {
                return Err(StoreError::IllegalTransition { from, to: next });
            }
            match self.phase.compare_exchange(
                observed,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!(
                        "event=lifecycle_transition module=lifecycle status=ok component={} from={} to={}",
                        self.component, from, next
                    );
                    return Ok(from);
                }
                Err(actual) => observed = actual,
            }
        }
    }

    /// Fails unless the current phase equals `expected`.
    pub fn require_phase(
        &self,
        expected: LifecyclePhase,
        operation: &'static str,
    ) -> StoreResult<()> {
        self.check(self.current(), |phase| phase == expected, operation)
    }

    /// Fails unless the current phase is one of the guard's phases.
    ///
    /// # Errors
    /// - `ComponentFailed` when the phase is `Failed`.
    /// - `NotReady` for any other disallowed phase.
    pub fn require(&self, guard: Guard, operation: &'static str) -> StoreResult<()> {
        self.check(self.current(), |phase| guard.permits(phase), operation)
    }

    /// Runs `body` only after `require(guard)` succeeds.
    pub fn guarded<T>(
        &self,
        guard: Guard,
        operation: &'static str,
        body: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.require(guard, operation)?;
        body()
    }

    /// Runs the start sequence: `Starting`, `do_start`, then `Started`.
    ///
    /// A `do_start` that fails or unwinds leaves the component `Failed`.
    pub fn start_with(&self, do_start: impl FnOnce() -> StoreResult<()>) -> StoreResult<()> {
        let started_at = Instant::now();
        self.transition_to(LifecyclePhase::Starting)?;
        info!(
            "event=store_start module=lifecycle status=start component={}",
            self.component
        );

        let pending = FailOnExit::arm(self);
        let outcome = do_start();
        if let Err(err) = outcome {
            drop(pending);
            error!(
                "event=store_start module=lifecycle status=error component={} duration_ms={} error={}",
                self.component,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
        pending.disarm();

        self.transition_to(LifecyclePhase::Started)?;
        info!(
            "event=store_start module=lifecycle status=ok component={} duration_ms={}",
            self.component,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Runs the stop sequence: `Stopping`, `do_stop`, then `Stopped`.
    ///
    /// A `do_stop` that fails or unwinds leaves the component `Failed`.
    pub fn stop_with(&self, do_stop: impl FnOnce() -> StoreResult<()>) -> StoreResult<()> {
        self.transition_to(LifecyclePhase::Stopping)?;
        info!(
            "event=store_stop module=lifecycle status=start component={}",
            self.component
        );

        let pending = FailOnExit::arm(self);
        let outcome = do_stop();
        if let Err(err) = outcome {
            drop(pending);
            error!(
                "event=store_stop module=lifecycle status=error component={} error={}",
                self.component, err
            );
            return Err(err);
        }
        pending.disarm();

        self.transition_to(LifecyclePhase::Stopped)?;
        info!(
            "event=store_stop module=lifecycle status=ok component={}",
            self.component
        );
        Ok(())
    }

    /// Moves to `Failed`. No-op when already failed.
    pub fn fail(&self) {
        if self.transition_to(LifecyclePhase::Failed).is_ok() {
            error!(
                "event=lifecycle_transition module=lifecycle status=error component={} to=FAILED",
                self.component
            );
        }
    }

    fn check(
        &self,
        phase: LifecyclePhase,
        permits: impl FnOnce(LifecyclePhase) -> bool,
        operation: &'static str,
    ) -> StoreResult<()> {
        if phase == LifecyclePhase::Failed {
            debug!(
                "event=guard_rejected module=lifecycle status=error component={} operation={} phase={}",
                self.component, operation, phase
            );
            return Err(StoreError::ComponentFailed { operation });
        }
        if !permits(phase) {
            debug!(
                "event=guard_rejected module=lifecycle status=error component={} operation={} phase={}",
                self.component, operation, phase
            );
            return Err(StoreError::NotReady { operation, phase });
        }
        Ok(())
    }
}

/// Moves its component to `Failed` when dropped while still armed.
struct FailOnExit<'g> {
    guard: &'g StateGuard,
    armed: bool,
}

impl<'g> FailOnExit<'g> {
    fn arm(guard: &'g StateGuard) -> Self {
        Self { guard, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FailOnExit<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.guard.fail();
        }
    }
}
