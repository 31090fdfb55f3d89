//! Per-object reference-count monitor keyed by opaque handles.

use crate::monitor::state::RefMap;
use crate::monitor::Monitor;
use crate::session::Session;
use crate::violation::{RuleId, Violation};
use serde::Serialize;
use std::fmt;

const REF_PUT_ABSENT: RuleId = RuleId::new("refcount", "put without get");
const REF_LEFT_HELD: RuleId = RuleId::new("refcount", "references outstanding at exit");

/// Opaque identity of a reference-counted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

/// Monitor tracking reference counts per object handle.
///
/// `get` inserts the handle with count 1 or increments it; `put` requires
/// the handle to be present, removing it when the count reaches zero. The
/// map must be empty at quiescence.
#[derive(Debug, Default)]
pub struct RefcountMonitor {
    refs: RefMap<HandleId>,
}

impl RefcountMonitor {
    /// Creates the monitor with no references outstanding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for taking a reference. Returns the new count.
    pub fn get(&mut self, handle: HandleId) -> u64 {
        self.refs.acquire(handle)
    }

    /// Hook for dropping a reference.
    pub fn put(&mut self, cx: &mut Session, handle: HandleId) {
        if self.refs.release(handle).is_none() {
            cx.report(REF_PUT_ABSENT, format!("put on {handle} with no reference"));
        }
    }

    /// Read-only query hook: current count for `handle`.
    #[must_use]
    pub fn count(&self, handle: HandleId) -> u64 {
        self.refs.count(handle)
    }

    /// Read-only query hook: does `handle` hold any reference?
    #[must_use]
    pub fn holds(&self, handle: HandleId) -> bool {
        self.refs.contains(handle)
    }
}

impl Monitor for RefcountMonitor {
    fn name(&self) -> &'static str {
        "refcount"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if !self.refs.is_empty() {
            return Err(Violation::new(
                REF_LEFT_HELD,
                format!("{} objects with outstanding references at exit", self.refs.len()),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.refs.clear();
    }
}
