//! Allocation-counter monitor with context-sensitive flag checks.

use crate::errptr::{self, errno, NULL};
use crate::monitor::state::UsageCounter;
use crate::monitor::Monitor;
use crate::session::{Session, Step};
use crate::violation::{RuleId, Violation};

const ALLOC_IRQ_FLAGS: RuleId = RuleId::new("alloc", "irq wrong flags");
const ALLOC_SPIN_FLAGS: RuleId = RuleId::new("alloc", "blocking alloc under spinlock");
const ALLOC_FREE_UNBALANCED: RuleId = RuleId::new("alloc", "free without alloc");
const ALLOC_LEAK: RuleId = RuleId::new("alloc", "allocation outstanding at exit");

/// Abstract GFP flag classes the monitor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocFlags {
    /// May not sleep (GFP_ATOMIC-class). Legal in any context.
    Atomic,
    /// May sleep to satisfy the request (GFP_KERNEL-class). Illegal in
    /// interrupt context and while a spinlock is held.
    Blocking,
}

/// Monitor counting outstanding allocations.
///
/// Allocation can fail nondeterministically, except that a blocking request
/// is assumed to succeed (the real allocator retries until it does), so the
/// failure branch is pruned rather than explored. Frees must match prior
/// successful allocations; the counter must be zero at quiescence.
#[derive(Debug, Default)]
pub struct AllocMonitor {
    outstanding: UsageCounter,
}

impl AllocMonitor {
    /// Creates the monitor with no outstanding allocations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for a kmalloc-style allocation returning a pointer or null.
    ///
    /// `spinlock_held` is the exclusive-lock monitor's query result; blocking
    /// flags while it holds are a violation.
    pub fn kmalloc(&mut self, cx: &mut Session, flags: AllocFlags, spinlock_held: bool) -> Step<u64> {
        if flags == AllocFlags::Blocking {
            if cx.in_interrupt_context() {
                cx.report(ALLOC_IRQ_FLAGS, "blocking flags in interrupt context");
            }
            if spinlock_held {
                cx.report(ALLOC_SPIN_FLAGS, "blocking flags while spinlock held");
            }
        }

        let succeeds = cx.choose_bool();
        if flags == AllocFlags::Blocking {
            // A blocking allocation cannot observably fail.
            cx.assume(succeeds)?;
        }
        if succeeds {
            self.outstanding.increment();
            return Ok(cx.choose_ptr());
        }
        Ok(NULL)
    }

    /// Hook for an allocation that reports failure as an encoded error
    /// pointer rather than null.
    pub fn alloc_handle(&mut self, cx: &mut Session) -> Step<u64> {
        if cx.choose_bool() {
            self.outstanding.increment();
            return Ok(cx.choose_ptr());
        }
        Ok(errptr::err_ptr(-errno::ENOMEM))
    }

    /// Hook for freeing one allocation.
    pub fn kfree(&mut self, cx: &mut Session) {
        if !self.outstanding.try_decrement() {
            cx.report(ALLOC_FREE_UNBALANCED, "free with no outstanding allocation");
        }
    }

    /// Read-only query hook: outstanding allocation count.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.outstanding.get()
    }
}

impl Monitor for AllocMonitor {
    fn name(&self) -> &'static str {
        "alloc"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if !self.outstanding.is_zero() {
            return Err(Violation::new(
                ALLOC_LEAK,
                format!("{} allocations outstanding at exit", self.outstanding.get()),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.outstanding.clear();
    }
}
