//! Lifecycle phases and state guards.
//!
//! # Responsibility
//! - Track the operational phase of a long-lived component.
//! - Gate every guarded operation behind the phases it declares.
//! - Provide the start/stop sequencing used by the owning process.
//!
//! # Invariants
//! - Transitions are monotonic: `Created -> Starting -> Started -> Stopping
//!   -> Stopped`, with `Failed` reachable from any non-failed phase.
//! - `Failed` is terminal and rejects every guarded operation.
//! - Operation calls never change the phase.

mod guard;
mod phase;

pub use guard::{Guard, StateGuard, STARTED};
pub use phase::LifecyclePhase;

use crate::error::StoreResult;

/// Start/stop capability of a component driven by its owning process.
pub trait Lifecycle {
    /// Moves the component from `Created` to `Started`.
    ///
    /// # Errors
    /// - `IllegalTransition` when the component was already started.
    /// - Any startup failure; the component is then `Failed`.
    fn start(&self) -> StoreResult<()>;

    /// Moves the component from `Started` to `Stopped`.
    ///
    /// # Errors
    /// - `IllegalTransition` when the component is not started.
    /// - Any shutdown failure; the component is then `Failed`.
    fn stop(&self) -> StoreResult<()>;

    fn phase(&self) -> LifecyclePhase;
}
