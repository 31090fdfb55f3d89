//! Verification-session context threaded through every monitor hook.
//!
//! One [`Session`] corresponds to one simulated run of the target module. It
//! owns the three cross-cutting pieces every hook needs: the choice source
//! (nondeterminism), the interrupt-context flag (scheduling shim), and the
//! violation ledger. Monitors own their own state and never reach around the
//! session.

use crate::choice::{ChoiceSource, DetChoices, ScriptedChoices};
use crate::errptr::{MAX_ERRNO, PTR_MAX};
use crate::violation::{RuleId, Violation, ViolationLedger};

/// Marker for a discontinued execution path.
///
/// Returned by [`Session::assume`] when its predicate is false: the path is
/// infeasible for the modeled contract, not wrong. Hooks propagate it with
/// `?`; the harness classifies such runs separately from violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infeasible;

impl std::fmt::Display for Infeasible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("path excluded by assumption")
    }
}

/// Result of one hook step: a value, or an infeasible path.
pub type Step<T> = Result<T, Infeasible>;

/// Per-run context passed `&mut` to every hook.
pub struct Session {
    choices: Box<dyn ChoiceSource>,
    ledger: ViolationLedger,
    in_interrupt: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("choices", &self.choices.source_id())
            .field("violations", &self.ledger.records().len())
            .field("in_interrupt", &self.in_interrupt)
            .finish()
    }
}

impl Session {
    /// Creates a session over an arbitrary choice source.
    #[must_use]
    pub fn new(choices: Box<dyn ChoiceSource>) -> Self {
        Self {
            choices,
            ledger: ViolationLedger::new(),
            in_interrupt: false,
        }
    }

    /// Creates a session with a seeded deterministic choice source.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self::new(Box::new(DetChoices::new(seed)))
    }

    /// Creates a session with a scripted choice source.
    #[must_use]
    pub fn scripted(values: impl IntoIterator<Item = u64>) -> Self {
        Self::new(Box::new(ScriptedChoices::new(values)))
    }

    /// Resets the session for a fresh run, keeping the choice source.
    pub fn initialize(&mut self) {
        self.ledger.reset();
        self.in_interrupt = false;
    }

    // ── Choice helpers ──────────────────────────────────────────────────

    /// Draws an unconstrained `u64`.
    pub fn choose_u64(&mut self) -> u64 {
        self.choices.next_u64()
    }

    /// Draws an unconstrained boolean.
    pub fn choose_bool(&mut self) -> bool {
        self.choices.next_bool()
    }

    /// Draws an `i64` in the inclusive range `[begin, end]`.
    pub fn choose_i64_in(&mut self, begin: i64, end: i64) -> i64 {
        debug_assert!(begin <= end);
        let span = end.wrapping_sub(begin) as u64;
        let offset = if span == u64::MAX {
            self.choices.next_u64()
        } else {
            self.choices.next_u64() % (span + 1)
        };
        begin.wrapping_add(offset as i64)
    }

    /// Draws a nonpositive value from the errno window `[-MAX_ERRNO, 0]`.
    pub fn choose_nonpositive(&mut self) -> i64 {
        -self.choose_i64_in(0, MAX_ERRNO)
    }

    /// Draws a strictly positive `i64`.
    pub fn choose_positive(&mut self) -> i64 {
        (self.choices.next_u64() % (i64::MAX as u64)) as i64 + 1
    }

    /// Draws a valid non-null pointer value (never in the error window).
    pub fn choose_ptr(&mut self) -> u64 {
        self.choices.next_u64() % PTR_MAX + 1
    }

    /// Discontinues the path unless `predicate` holds.
    ///
    /// This excludes values the real API provably cannot produce. It must
    /// never stand in for a precondition check; an illegal call is reported
    /// via [`Session::report`], not assumed away.
    pub fn assume(&mut self, predicate: bool) -> Step<()> {
        if predicate { Ok(()) } else { Err(Infeasible) }
    }

    // ── Violation signal ────────────────────────────────────────────────

    /// Records a contract violation. Irreversible for this run.
    pub fn report(&mut self, rule: RuleId, detail: impl Into<String>) {
        self.ledger.record(Violation::new(rule, detail));
    }

    /// Read access to the violation ledger.
    #[must_use]
    pub fn ledger(&self) -> &ViolationLedger {
        &self.ledger
    }

    /// Mutable access to the ledger, for final-state aggregation.
    pub(crate) fn ledger_mut(&mut self) -> &mut ViolationLedger {
        &mut self.ledger
    }

    // ── Context/scheduling shim ─────────────────────────────────────────

    /// Marks the start of interrupt-context execution.
    pub fn enter_interrupt_context(&mut self) {
        self.in_interrupt = true;
    }

    /// Marks the return to process-context execution.
    pub fn leave_interrupt_context(&mut self) {
        self.in_interrupt = false;
    }

    /// Returns true iff execution is currently in interrupt context.
    #[must_use]
    pub fn in_interrupt_context(&self) -> bool {
        self.in_interrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errptr::is_err_or_null;

    #[test]
    fn assume_true_continues_false_discontinues() {
        let mut cx = Session::deterministic(1);
        assert_eq!(cx.assume(true), Ok(()));
        assert_eq!(cx.assume(false), Err(Infeasible));
        // Assumption failure is not a violation.
        assert!(cx.ledger().is_clean());
    }

    #[test]
    fn ranged_choices_stay_in_range() {
        let mut cx = Session::deterministic(99);
        for _ in 0..256 {
            let v = cx.choose_i64_in(-3, 5);
            assert!((-3..=5).contains(&v));
            let n = cx.choose_nonpositive();
            assert!((-MAX_ERRNO..=0).contains(&n));
            assert!(cx.choose_positive() > 0);
            assert!(!is_err_or_null(cx.choose_ptr()));
        }
    }

    #[test]
    fn interrupt_flag_toggles() {
        let mut cx = Session::deterministic(0);
        assert!(!cx.in_interrupt_context());
        cx.enter_interrupt_context();
        assert!(cx.in_interrupt_context());
        cx.leave_interrupt_context();
        assert!(!cx.in_interrupt_context());
    }

    #[test]
    fn initialize_clears_ledger_and_context() {
        let mut cx = Session::deterministic(0);
        cx.enter_interrupt_context();
        cx.report(RuleId::new("spin", "double lock"), "held");
        cx.initialize();
        assert!(cx.ledger().is_clean());
        assert!(!cx.in_interrupt_context());
    }

    #[test]
    fn scripted_session_pins_outcomes() {
        let mut cx = Session::scripted([1, 0]);
        assert!(cx.choose_bool());
        assert!(!cx.choose_bool());
    }
}
