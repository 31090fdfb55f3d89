//! Reusable state shapes for resource monitors.
//!
//! Three shapes cover every canonical monitor: a per-monitor enum (declared
//! by each monitor itself), the saturating [`UsageCounter`], and the
//! key-keyed [`RefMap`]. The helpers never report violations on their own;
//! they surface illegal transitions to the owning monitor, which knows which
//! rule to tag.

use std::collections::HashMap;
use std::hash::Hash;

/// Outstanding-use counter that refuses to go negative.
///
/// Quiescence for a counter-shaped monitor means exactly zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounter {
    count: u64,
}

impl UsageCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Current outstanding count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.count
    }

    /// Returns true iff the counter is at its quiescent value.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.count == 0
    }

    /// Records one more outstanding use.
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Records one release. Returns false (leaving the counter untouched)
    /// if nothing was outstanding.
    pub fn try_decrement(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    /// Drops every outstanding use in one step.
    pub fn clear(&mut self) {
        self.count = 0;
    }
}

/// Key→count map for per-object reference tracking.
///
/// A key present in the map always has a strictly positive count; dropping
/// the last reference removes the key. Quiescence means an empty map.
#[derive(Debug, Clone)]
pub struct RefMap<K> {
    counts: HashMap<K, u64>,
}

impl<K> Default for RefMap<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> RefMap<K> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a reference on `key`, returning the new count.
    pub fn acquire(&mut self, key: K) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Drops a reference on `key`.
    ///
    /// Returns the remaining count, or `None` (map untouched) if `key` held
    /// no reference. A zero return means the key was removed.
    pub fn release(&mut self, key: K) -> Option<u64> {
        let count = self.counts.get_mut(&key)?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
            return Some(0);
        }
        Some(*count)
    }

    /// Current count for `key` (zero if absent).
    #[must_use]
    pub fn count(&self, key: K) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Returns true iff `key` holds at least one reference.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.counts.contains_key(&key)
    }

    /// Returns true iff no key holds a reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct keys with outstanding references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Removes every reference.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_never_goes_negative() {
        let mut c = UsageCounter::new();
        assert!(!c.try_decrement());
        assert!(c.is_zero());

        c.increment();
        c.increment();
        assert_eq!(c.get(), 2);
        assert!(c.try_decrement());
        assert!(c.try_decrement());
        assert!(!c.try_decrement());
        assert!(c.is_zero());
    }

    #[test]
    fn refmap_removes_key_at_zero() {
        let mut m: RefMap<u64> = RefMap::new();
        assert_eq!(m.acquire(7), 1);
        assert_eq!(m.acquire(7), 2);
        assert_eq!(m.release(7), Some(1));
        assert!(m.contains(7));
        assert_eq!(m.release(7), Some(0));
        assert!(!m.contains(7));
        assert!(m.is_empty());
    }

    #[test]
    fn refmap_release_absent_is_none() {
        let mut m: RefMap<u64> = RefMap::new();
        assert_eq!(m.release(1), None);
        m.acquire(2);
        assert_eq!(m.release(1), None);
        assert_eq!(m.count(2), 1);
    }
}
