//! Monitor suite: one instance of every canonical monitor plus the
//! final-state aggregator.
//!
//! The suite is the inbound call surface the simulated module's entry points
//! hit: one facade method per modeled kernel API, named
//! `<subsystem>_<verb>`. Facades exist so cross-cutting preconditions (the
//! allocator consulting the spin-lock query hook) are wired in one place;
//! monitors stay ignorant of each other.

use crate::monitor::{
    AllocFlags, AllocMonitor, FdPoolMonitor, HandleId, Monitor, ProbeMonitor, RcuLockMonitor,
    RefcountMonitor, RegistrationMonitor, RwLockMonitor, SpinLockMonitor,
};
use crate::session::{Session, Step};

/// All canonical monitors for one simulated run.
#[derive(Debug, Default)]
pub struct MonitorSuite {
    /// Exclusive spin-style lock.
    pub spinlock: SpinLockMonitor,
    /// Reader/writer lock.
    pub rwlock: RwLockMonitor,
    /// RCU-style reentrant read sections.
    pub rcu: RcuLockMonitor,
    /// Outstanding-allocation counter.
    pub alloc: AllocMonitor,
    /// Register/unregister pair.
    pub registration: RegistrationMonitor,
    /// Per-object reference counts.
    pub refcount: RefcountMonitor,
    /// Bounded descriptor pool.
    pub fds: FdPoolMonitor,
    /// Probe/release with asymmetric release hooks.
    pub probe: ProbeMonitor,
}

impl MonitorSuite {
    /// Creates a suite with every monitor in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every monitor for a fresh run.
    ///
    /// Invoked before any simulated entry point; pairs with
    /// [`MonitorSuite::check_final_state`] after the last one.
    pub fn initialize(&mut self) {
        self.spinlock.reset();
        self.rwlock.reset();
        self.rcu.reset();
        self.alloc.reset();
        self.registration.reset();
        self.refcount.reset();
        self.fds.reset();
        self.probe.reset();
    }

    fn monitors(&self) -> [&dyn Monitor; 8] {
        [
            &self.spinlock,
            &self.rwlock,
            &self.rcu,
            &self.alloc,
            &self.registration,
            &self.refcount,
            &self.fds,
            &self.probe,
        ]
    }

    /// Runs every monitor's final check exactly once, recording each failure
    /// in the session ledger.
    ///
    /// Monitors are independent, so the order is immaterial. A run that
    /// already recorded a violation stays classified by that first record.
    pub fn check_final_state(&self, cx: &mut Session) {
        for monitor in self.monitors() {
            tracing::debug!(monitor = monitor.name(), "final-state check");
            if let Err(violation) = monitor.check_final() {
                cx.ledger_mut().record(violation);
            }
        }
    }

    // ── Inbound kernel-API facade ───────────────────────────────────────

    /// `spin_lock`.
    pub fn spin_lock(&mut self, cx: &mut Session) {
        tracing::debug!(op = "spin_lock", "hook");
        self.spinlock.acquire(cx);
    }

    /// `spin_unlock`.
    pub fn spin_unlock(&mut self, cx: &mut Session) {
        tracing::debug!(op = "spin_unlock", "hook");
        self.spinlock.release(cx);
    }

    /// `spin_trylock`. Returns true iff the lock was taken.
    pub fn spin_trylock(&mut self, cx: &mut Session) -> bool {
        tracing::debug!(op = "spin_trylock", "hook");
        self.spinlock.try_acquire(cx)
    }

    /// `read_lock` on the reader/writer lock.
    pub fn rw_read_lock(&mut self, cx: &mut Session) {
        self.rwlock.read_lock(cx);
    }

    /// `read_unlock` on the reader/writer lock.
    pub fn rw_read_unlock(&mut self, cx: &mut Session) {
        self.rwlock.read_unlock(cx);
    }

    /// `write_lock` on the reader/writer lock.
    pub fn rw_write_lock(&mut self, cx: &mut Session) {
        self.rwlock.write_lock(cx);
    }

    /// `write_unlock` on the reader/writer lock.
    pub fn rw_write_unlock(&mut self, cx: &mut Session) {
        self.rwlock.write_unlock(cx);
    }

    /// `rcu_read_lock`.
    pub fn rcu_read_lock(&mut self) {
        self.rcu.read_lock();
    }

    /// `rcu_read_unlock`.
    pub fn rcu_read_unlock(&mut self, cx: &mut Session) {
        self.rcu.read_unlock(cx);
    }

    /// `kmalloc`. The allocator consults the spin-lock query hook for its
    /// may-not-sleep precondition.
    pub fn kmalloc(&mut self, cx: &mut Session, flags: AllocFlags) -> Step<u64> {
        tracing::debug!(op = "kmalloc", ?flags, "hook");
        let spinlock_held = self.spinlock.is_locked();
        self.alloc.kmalloc(cx, flags, spinlock_held)
    }

    /// Handle-returning allocation using the pointer/error codec.
    pub fn alloc_handle(&mut self, cx: &mut Session) -> Step<u64> {
        self.alloc.alloc_handle(cx)
    }

    /// `kfree`.
    pub fn kfree(&mut self, cx: &mut Session) {
        self.alloc.kfree(cx);
    }

    /// Subsystem registration. Returns 0 or a negative errno.
    pub fn register(&mut self, cx: &mut Session) -> Step<i64> {
        self.registration.register(cx)
    }

    /// Subsystem deregistration.
    pub fn unregister(&mut self, cx: &mut Session) {
        self.registration.unregister(cx);
    }

    /// Reference `get` on `handle`. Returns the new count.
    pub fn ref_get(&mut self, handle: HandleId) -> u64 {
        self.refcount.get(handle)
    }

    /// Reference `put` on `handle`.
    pub fn ref_put(&mut self, cx: &mut Session, handle: HandleId) {
        self.refcount.put(cx, handle);
    }

    /// Descriptor open. Returns the descriptor or a negative errno.
    pub fn fd_open(&mut self, cx: &mut Session) -> Step<i64> {
        self.fds.open(cx)
    }

    /// Descriptor close.
    pub fn fd_close(&mut self, cx: &mut Session, fd: i64) {
        self.fds.close(cx, fd);
    }

    /// Probe taking one resource.
    pub fn probe_up(&mut self) {
        self.probe.probe_up();
    }

    /// Release of exactly one probed resource.
    pub fn release_down(&mut self, cx: &mut Session) {
        self.probe.release_down(cx);
    }

    /// Release of every probed resource in one step.
    pub fn release_completely(&mut self, cx: &mut Session) {
        self.probe.release_completely(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_suite_passes_final_checks() {
        let mut cx = Session::deterministic(1);
        let suite = MonitorSuite::new();
        suite.check_final_state(&mut cx);
        assert!(cx.ledger().is_clean());
    }

    #[test]
    fn final_checks_record_every_leak() {
        let mut cx = Session::scripted([1]);
        let mut suite = MonitorSuite::new();
        suite.spin_lock(&mut cx);
        suite.rcu_read_lock();
        let _ = suite.register(&mut cx).unwrap();
        suite.check_final_state(&mut cx);

        let subsystems: Vec<&str> = cx
            .ledger()
            .records()
            .iter()
            .map(|v| v.rule.subsystem)
            .collect();
        assert_eq!(subsystems, vec!["spin", "rcu", "register"]);
    }

    #[test]
    fn initialize_resets_all_monitors() {
        let mut cx = Session::scripted([1, 1]);
        let mut suite = MonitorSuite::new();
        suite.spin_lock(&mut cx);
        suite.rcu_read_lock();
        suite.probe_up();
        suite.ref_get(HandleId(1));
        let _ = suite.fd_open(&mut cx).unwrap();

        suite.initialize();
        cx.initialize();
        suite.check_final_state(&mut cx);
        assert!(cx.ledger().is_clean());
    }

    #[test]
    fn kmalloc_consults_spinlock_query() {
        let mut cx = Session::scripted([1, 0x500]);
        let mut suite = MonitorSuite::new();
        suite.spin_lock(&mut cx);
        let _ = suite.kmalloc(&mut cx, AllocFlags::Blocking).unwrap();
        assert_eq!(cx.ledger().first().unwrap().rule.subsystem, "alloc");
    }
}
