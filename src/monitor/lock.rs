//! Exclusive-lock and reader/writer-lock monitors.

use crate::monitor::state::UsageCounter;
use crate::monitor::Monitor;
use crate::session::Session;
use crate::violation::{RuleId, Violation};

/// State of an exclusive lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Nobody holds the lock.
    #[default]
    Free,
    /// The simulated module holds the lock.
    Held,
}

const SPIN_DOUBLE_LOCK: RuleId = RuleId::new("spin", "double lock");
const SPIN_DOUBLE_UNLOCK: RuleId = RuleId::new("spin", "unlock of free lock");
const SPIN_LEFT_LOCKED: RuleId = RuleId::new("spin", "left locked at exit");

/// Monitor for an exclusive (spin/mutex-style) lock modeled as a singleton.
///
/// Transitions: `acquire` free→held, `release` held→free, `try_acquire`
/// free→held with nondeterministic success. Acquiring a held lock or
/// releasing a free one is a violation; the state is left unchanged so the
/// rest of the run stays meaningful.
#[derive(Debug, Default)]
pub struct SpinLockMonitor {
    state: LockState,
}

impl SpinLockMonitor {
    /// Creates the monitor in the free state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for unconditional acquisition.
    pub fn acquire(&mut self, cx: &mut Session) {
        if self.state == LockState::Held {
            cx.report(SPIN_DOUBLE_LOCK, "acquire while already held");
            return;
        }
        self.state = LockState::Held;
    }

    /// Hook for release.
    pub fn release(&mut self, cx: &mut Session) {
        if self.state == LockState::Free {
            cx.report(SPIN_DOUBLE_UNLOCK, "release while free");
            return;
        }
        self.state = LockState::Free;
    }

    /// Hook for conditional acquisition. Returns true iff the lock was
    /// taken. A held lock always refuses; a free lock succeeds or fails at
    /// the choice source's discretion.
    pub fn try_acquire(&mut self, cx: &mut Session) -> bool {
        if self.state == LockState::Held {
            return false;
        }
        if cx.choose_bool() {
            self.state = LockState::Held;
            return true;
        }
        false
    }

    /// Read-only query hook for cross-monitor preconditions.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == LockState::Held
    }
}

impl Monitor for SpinLockMonitor {
    fn name(&self) -> &'static str {
        "spinlock"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if self.state == LockState::Held {
            return Err(Violation::new(SPIN_LEFT_LOCKED, "lock held at module exit"));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = LockState::Free;
    }
}

const RW_READ_VS_WRITER: RuleId = RuleId::new("rwlock", "read lock under writer");
const RW_READ_UNBALANCED: RuleId = RuleId::new("rwlock", "unbalanced read unlock");
const RW_DOUBLE_WRITE: RuleId = RuleId::new("rwlock", "double write lock");
const RW_WRITE_UNBALANCED: RuleId = RuleId::new("rwlock", "write unlock of free lock");
const RW_LEFT_LOCKED: RuleId = RuleId::new("rwlock", "left locked at exit");

/// Monitor for a reader/writer lock.
///
/// Tracks a reader count and a writer flag. Read locking requires the writer
/// side to be free; write locking only checks mutual exclusion with the
/// writer flag (the reader count is deliberately not part of that
/// precondition in this model).
#[derive(Debug, Default)]
pub struct RwLockMonitor {
    readers: UsageCounter,
    writer: LockState,
}

impl RwLockMonitor {
    /// Creates the monitor with no readers and a free writer side.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for taking the lock for reading.
    pub fn read_lock(&mut self, cx: &mut Session) {
        if self.writer == LockState::Held {
            cx.report(RW_READ_VS_WRITER, "read lock while write side held");
            return;
        }
        self.readers.increment();
    }

    /// Hook for dropping a read side.
    pub fn read_unlock(&mut self, cx: &mut Session) {
        if !self.readers.try_decrement() {
            cx.report(RW_READ_UNBALANCED, "read unlock with zero readers");
        }
    }

    /// Hook for taking the lock for writing.
    pub fn write_lock(&mut self, cx: &mut Session) {
        if self.writer == LockState::Held {
            cx.report(RW_DOUBLE_WRITE, "write lock while write side held");
            return;
        }
        self.writer = LockState::Held;
    }

    /// Hook for dropping the write side.
    pub fn write_unlock(&mut self, cx: &mut Session) {
        if self.writer == LockState::Free {
            cx.report(RW_WRITE_UNBALANCED, "write unlock while free");
            return;
        }
        self.writer = LockState::Free;
    }

    /// Read-only query hook: is the write side held?
    #[must_use]
    pub fn is_write_locked(&self) -> bool {
        self.writer == LockState::Held
    }

    /// Read-only query hook: outstanding reader count.
    #[must_use]
    pub fn reader_count(&self) -> u64 {
        self.readers.get()
    }
}

impl Monitor for RwLockMonitor {
    fn name(&self) -> &'static str {
        "rwlock"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if !self.readers.is_zero() || self.writer == LockState::Held {
            return Err(Violation::new(
                RW_LEFT_LOCKED,
                format!(
                    "at exit: {} readers, writer {:?}",
                    self.readers.get(),
                    self.writer
                ),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.readers.clear();
        self.writer = LockState::Free;
    }
}
