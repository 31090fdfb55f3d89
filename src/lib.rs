//! Kmodel: contract-monitor automaton models of Linux-kernel-style APIs.
//!
//! # Overview
//!
//! Environment-model corpora teach an external model checker how kernel APIs
//! (locks, allocators, reference counts, registration pairs, descriptors)
//! behave abstractly, so the checker can prove a target module uses them
//! correctly. This crate is the reusable core those corpora instantiate:
//!
//! - **Choice source** ([`choice`]): unconstrained values standing in for
//!   unknown real behavior, plus `assume` to discontinue infeasible paths.
//! - **Violation signal** ([`violation`]): the single "contract broken"
//!   outcome, recorded in a per-run ledger and tagged with a rule id.
//! - **Pointer/error codec** ([`errptr`]): the `ERR_PTR`/`IS_ERR` encoding of
//!   handle-or-failure results in one value domain.
//! - **Resource monitors** ([`monitor`]): finite-state automata with one hook
//!   per intercepted API — precondition check, nondeterministic outcome,
//!   state transition, result.
//! - **Final-state aggregation** ([`suite`]): every monitor must be back in
//!   its quiescent state when a simulated run legitimately ends.
//! - **Session** ([`session`]): per-run context holding the choice source,
//!   the interrupt-context flag, and the ledger; passed `&mut` to every hook
//!   instead of process-wide globals.
//! - **Harness** ([`harness`]): deterministic scenario driver classifying a
//!   run as clean, violating, or infeasible.
//!
//! # Core rule
//!
//! Preconditions are checked with plain `if` plus a violation report, never
//! with `assume`: an assumption makes the offending path disappear instead
//! of being reported, which is exactly the wrong behavior for a monitor.
//!
//! # Example
//!
//! ```
//! use kmodel::harness::{run_scripted, Verdict};
//!
//! let report = run_scripted([1], |suite, cx| {
//!     let rc = suite.register(cx)?;
//!     assert_eq!(rc, 0);
//!     suite.unregister(cx);
//!     Ok(())
//! });
//! assert_eq!(report.verdict, Verdict::Clean);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod choice;
pub mod errptr;
pub mod harness;
pub mod monitor;
pub mod session;
pub mod suite;
pub mod violation;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use choice::{ChoiceSource, DetChoices, ScriptedChoices};
pub use harness::{run_scenario, run_scripted, run_seeds, RunReport, Verdict};
pub use monitor::{
    AllocFlags, AllocMonitor, FdPoolMonitor, HandleId, Monitor, ProbeMonitor, RcuLockMonitor,
    RefcountMonitor, RegistrationMonitor, RwLockMonitor, SpinLockMonitor,
};
pub use session::{Infeasible, Session, Step};
pub use suite::MonitorSuite;
pub use violation::{RuleId, Violation, ViolationLedger};

/// Phase tracking macro for structured test logging.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(test = $name, "=== TEST START ===");
    };
}

/// Completion marker macro for structured test logging.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = $name, "=== TEST COMPLETE ===");
    };
}

/// Assertion with logging for better test output.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        if !$cond {
            tracing::error!(
                message = $msg,
                expected = ?$expected,
                actual = ?$actual,
                "Assertion failed"
            );
        }
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}
