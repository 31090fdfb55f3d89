//! Resource monitors: finite-state trackers for kernel API contracts.
//!
//! Every monitor follows the same automaton shape: a small state value, one
//! hook per intercepted API, and a final check. A hook checks its
//! precondition (recording a violation and keeping the old state when the
//! call is illegal), draws the call's abstract outcome from the session's
//! choice source where the real API can fail, applies the transition, and
//! returns the outcome to the simulated caller.
//!
//! Monitors never inspect each other's state directly; cross-cutting
//! preconditions go through read-only query hooks like
//! [`lock::SpinLockMonitor::is_locked`].

pub mod alloc;
pub mod fd;
pub mod lock;
pub mod nesting;
pub mod probe;
pub mod refcount;
pub mod registration;
pub mod state;

pub use alloc::{AllocFlags, AllocMonitor};
pub use fd::FdPoolMonitor;
pub use lock::{RwLockMonitor, SpinLockMonitor};
pub use nesting::RcuLockMonitor;
pub use probe::ProbeMonitor;
pub use refcount::{HandleId, RefcountMonitor};
pub use registration::RegistrationMonitor;
pub use state::{RefMap, UsageCounter};

use crate::violation::Violation;

/// Common surface of every resource monitor.
///
/// The hooks themselves keep concrete signatures on each monitor type; this
/// trait covers what the final-state aggregator needs.
pub trait Monitor {
    /// Stable monitor name for diagnostics.
    fn name(&self) -> &'static str;

    /// Asserts the monitor is back in its quiescent state.
    ///
    /// Called exactly once per run, after all simulated entry points.
    fn check_final(&self) -> Result<(), Violation>;

    /// Returns the monitor to its initial state for a fresh run.
    fn reset(&mut self);
}
