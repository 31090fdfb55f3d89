//! Probe/release monitor with asymmetric release hooks.

use crate::monitor::state::UsageCounter;
use crate::monitor::Monitor;
use crate::session::Session;
use crate::violation::{RuleId, Violation};

const PROBE_DOWN_UNPROBED: RuleId = RuleId::new("probe", "release without probe");
const PROBE_CLEAR_UNPROBED: RuleId = RuleId::new("probe", "release completely without probe");
const PROBE_LEFT_HELD: RuleId = RuleId::new("probe", "probed resources at exit");

/// Monitor for probe-acquired resources with asymmetric release.
///
/// `probe_up` takes one resource; `release_down` gives back exactly one;
/// `release_completely` gives back everything in a single step. The two
/// release hooks carry distinct preconditions and are deliberately not
/// collapsed into one decrement: callers rely on their different failure
/// conditions.
#[derive(Debug, Default)]
pub struct ProbeMonitor {
    probed: UsageCounter,
}

impl ProbeMonitor {
    /// Creates the monitor with nothing probed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for a successful probe taking one resource.
    pub fn probe_up(&mut self) {
        self.probed.increment();
    }

    /// Hook releasing exactly one probed resource.
    pub fn release_down(&mut self, cx: &mut Session) {
        if !self.probed.try_decrement() {
            cx.report(PROBE_DOWN_UNPROBED, "release with nothing probed");
        }
    }

    /// Hook releasing every probed resource at once (module-exit path).
    pub fn release_completely(&mut self, cx: &mut Session) {
        if self.probed.is_zero() {
            cx.report(PROBE_CLEAR_UNPROBED, "release completely with nothing probed");
            return;
        }
        self.probed.clear();
    }

    /// Read-only query hook: resources currently probed.
    #[must_use]
    pub fn probed(&self) -> u64 {
        self.probed.get()
    }
}

impl Monitor for ProbeMonitor {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if !self.probed.is_zero() {
            return Err(Violation::new(
                PROBE_LEFT_HELD,
                format!("{} probed resources at exit", self.probed.get()),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.probed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_down_leaves_one_outstanding() {
        let mut cx = Session::deterministic(1);
        let mut probe = ProbeMonitor::new();
        probe.probe_up();
        probe.probe_up();
        probe.release_down(&mut cx);
        assert!(cx.ledger().is_clean());
        assert_eq!(probe.probed(), 1);
        assert_eq!(probe.check_final().unwrap_err().rule, PROBE_LEFT_HELD);
    }

    #[test]
    fn release_completely_clears_in_one_step() {
        let mut cx = Session::deterministic(1);
        let mut probe = ProbeMonitor::new();
        probe.probe_up();
        probe.probe_up();
        probe.probe_up();
        probe.release_completely(&mut cx);
        assert!(cx.ledger().is_clean());
        assert_eq!(probe.probed(), 0);
        assert!(probe.check_final().is_ok());
    }

    #[test]
    fn release_down_without_probe_violates() {
        let mut cx = Session::deterministic(1);
        let mut probe = ProbeMonitor::new();
        probe.release_down(&mut cx);
        assert_eq!(cx.ledger().first().unwrap().rule, PROBE_DOWN_UNPROBED);
    }

    #[test]
    fn release_completely_without_probe_violates_distinctly() {
        let mut cx = Session::deterministic(1);
        let mut probe = ProbeMonitor::new();
        probe.release_completely(&mut cx);
        assert_eq!(cx.ledger().first().unwrap().rule, PROBE_CLEAR_UNPROBED);
    }
}
