//! Bounded file-descriptor pool monitor.

use crate::errptr::errno;
use crate::monitor::Monitor;
use crate::session::{Session, Step};
use crate::violation::{RuleId, Violation};

const FD_CLOSE_FREE: RuleId = RuleId::new("fd", "close of unopened descriptor");
const FD_LEFT_OPEN: RuleId = RuleId::new("fd", "descriptor open at exit");

/// Number of descriptor slots the model tracks.
pub const POOL_SIZE: usize = 5;

/// Monitor for a bounded pool of file descriptors.
///
/// `open` hands out the lowest free slot, or `-EMFILE` when the pool is
/// exhausted; even with a slot free, the choice source may fail the open
/// (any other error the real syscall can hit). `close` requires the slot to
/// be occupied. All slots must be free at quiescence.
#[derive(Debug, Default)]
pub struct FdPoolMonitor {
    occupied: [bool; POOL_SIZE],
}

impl FdPoolMonitor {
    /// Creates the monitor with every slot free.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for opening a descriptor. Returns the descriptor or a negative
    /// errno.
    pub fn open(&mut self, cx: &mut Session) -> Step<i64> {
        let Some(slot) = self.occupied.iter().position(|used| !used) else {
            return Ok(-errno::EMFILE);
        };
        if cx.choose_bool() {
            self.occupied[slot] = true;
            return Ok(slot as i64);
        }
        Ok(-errno::EMFILE)
    }

    /// Hook for closing a descriptor.
    pub fn close(&mut self, cx: &mut Session, fd: i64) {
        let Some(slot) = usize::try_from(fd).ok().filter(|&s| s < POOL_SIZE) else {
            cx.report(FD_CLOSE_FREE, format!("close of descriptor {fd} outside pool"));
            return;
        };
        if !self.occupied[slot] {
            cx.report(FD_CLOSE_FREE, format!("close of free descriptor {fd}"));
            return;
        }
        self.occupied[slot] = false;
    }

    /// Read-only query hook: number of open descriptors.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.occupied.iter().filter(|&&used| used).count()
    }
}

impl Monitor for FdPoolMonitor {
    fn name(&self) -> &'static str {
        "fd"
    }

    fn check_final(&self) -> Result<(), Violation> {
        let open = self.open_count();
        if open != 0 {
            return Err(Violation::new(
                FD_LEFT_OPEN,
                format!("{open} descriptors open at module exit"),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.occupied = [false; POOL_SIZE];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_hands_out_lowest_free_slot() {
        // Script: four successful opens.
        let mut cx = Session::scripted([1, 1, 1, 1]);
        let mut fds = FdPoolMonitor::new();
        assert_eq!(fds.open(&mut cx).unwrap(), 0);
        assert_eq!(fds.open(&mut cx).unwrap(), 1);
        fds.close(&mut cx, 0);
        assert_eq!(fds.open(&mut cx).unwrap(), 0);
        assert_eq!(fds.open(&mut cx).unwrap(), 2);
        assert!(cx.ledger().is_clean());
    }

    #[test]
    fn exhausted_pool_returns_emfile() {
        let mut cx = Session::scripted([1, 1, 1, 1, 1, 1]);
        let mut fds = FdPoolMonitor::new();
        for expected in 0..POOL_SIZE as i64 {
            assert_eq!(fds.open(&mut cx).unwrap(), expected);
        }
        assert_eq!(fds.open(&mut cx).unwrap(), -errno::EMFILE);
        assert_eq!(fds.open_count(), POOL_SIZE);
    }

    #[test]
    fn open_may_fail_even_with_free_slots() {
        let mut cx = Session::scripted([0]);
        let mut fds = FdPoolMonitor::new();
        assert_eq!(fds.open(&mut cx).unwrap(), -errno::EMFILE);
        assert_eq!(fds.open_count(), 0);
        assert!(cx.ledger().is_clean());
    }

    #[test]
    fn close_of_free_slot_violates() {
        let mut cx = Session::deterministic(1);
        let mut fds = FdPoolMonitor::new();
        fds.close(&mut cx, 2);
        assert_eq!(cx.ledger().first().unwrap().rule, FD_CLOSE_FREE);
    }

    #[test]
    fn close_of_out_of_range_descriptor_violates() {
        let mut cx = Session::deterministic(1);
        let mut fds = FdPoolMonitor::new();
        fds.close(&mut cx, -1);
        fds.close(&mut cx, POOL_SIZE as i64);
        assert_eq!(cx.ledger().records().len(), 2);
    }

    #[test]
    fn open_descriptor_fails_final_check() {
        let mut cx = Session::scripted([1]);
        let mut fds = FdPoolMonitor::new();
        let fd = fds.open(&mut cx).unwrap();
        assert_eq!(fds.check_final().unwrap_err().rule, FD_LEFT_OPEN);
        fds.close(&mut cx, fd);
        assert!(fds.check_final().is_ok());
    }
}
