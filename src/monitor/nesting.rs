//! Reentrant nesting-lock monitor (RCU/SRCU-style read sections).

use crate::monitor::state::UsageCounter;
use crate::monitor::Monitor;
use crate::session::Session;
use crate::violation::{RuleId, Violation};

const RCU_UNBALANCED: RuleId = RuleId::new("rcu", "unbalanced read unlock");
const RCU_LEFT_OPEN: RuleId = RuleId::new("rcu", "read section open at exit");

/// Monitor for a reentrant read-side critical section.
///
/// Entering nests freely; leaving requires a matching enter. Quiescence is
/// nesting depth zero.
#[derive(Debug, Default)]
pub struct RcuLockMonitor {
    depth: UsageCounter,
}

impl RcuLockMonitor {
    /// Creates the monitor at depth zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for entering a read-side section. Always legal.
    pub fn read_lock(&mut self) {
        self.depth.increment();
    }

    /// Hook for leaving a read-side section.
    pub fn read_unlock(&mut self, cx: &mut Session) {
        if !self.depth.try_decrement() {
            cx.report(RCU_UNBALANCED, "read unlock at depth zero");
        }
    }

    /// Read-only query hook: current nesting depth.
    #[must_use]
    pub fn depth(&self) -> u64 {
        self.depth.get()
    }
}

impl Monitor for RcuLockMonitor {
    fn name(&self) -> &'static str {
        "rcu"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if !self.depth.is_zero() {
            return Err(Violation::new(
                RCU_LEFT_OPEN,
                format!("nesting depth {} at module exit", self.depth.get()),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.depth.clear();
    }
}
