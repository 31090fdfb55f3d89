//! Violation signal and per-run violation ledger.
//!
//! A violation is the single error taxonomy of the model: a contract was
//! broken at a specific hook. It is recorded, never thrown; the first record
//! classifies the whole run as unsafe. The rule tag exists for triage only
//! and never drives control flow.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Identifies which contract rule fired.
///
/// Rendered as `linux:<subsystem>::<rule>`, matching the diagnostic tags the
/// external verifier surfaces to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RuleId {
    /// Modeled subsystem (e.g. `"spin"`, `"alloc"`).
    pub subsystem: &'static str,
    /// Short rule name within the subsystem.
    pub rule: &'static str,
}

impl RuleId {
    /// Creates a rule identifier.
    #[must_use]
    pub const fn new(subsystem: &'static str, rule: &'static str) -> Self {
        Self { subsystem, rule }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linux:{}::{}", self.subsystem, self.rule)
    }
}

/// A recorded contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{rule}: {detail}")]
pub struct Violation {
    /// The rule that fired.
    pub rule: RuleId,
    /// Human-readable state snapshot at the point of violation.
    pub detail: String,
}

impl Violation {
    /// Creates a violation record.
    #[must_use]
    pub fn new(rule: RuleId, detail: impl Into<String>) -> Self {
        Self {
            rule,
            detail: detail.into(),
        }
    }
}

/// Append-only record of violations for one simulated run.
///
/// Recording is irreversible within a run; [`ViolationLedger::reset`] starts
/// the next run. Most runs record zero or one entry, hence the inline
/// capacity.
#[derive(Debug, Default)]
pub struct ViolationLedger {
    records: SmallVec<[Violation; 1]>,
}

impl ViolationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn record(&mut self, violation: Violation) {
        tracing::warn!(rule = %violation.rule, detail = %violation.detail, "contract violation");
        self.records.push(violation);
    }

    /// Returns true iff no violation has been recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the first (definitive) violation, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Violation> {
        self.records.first()
    }

    /// Returns all recorded violations in order.
    #[must_use]
    pub fn records(&self) -> &[Violation] {
        &self.records
    }

    /// Clears the ledger for a fresh run.
    pub fn reset(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_display_format() {
        let rule = RuleId::new("alloc", "irq wrong flags");
        assert_eq!(rule.to_string(), "linux:alloc::irq wrong flags");
    }

    #[test]
    fn ledger_keeps_order_and_first() {
        let mut ledger = ViolationLedger::new();
        assert!(ledger.is_clean());

        ledger.record(Violation::new(RuleId::new("spin", "double lock"), "held"));
        ledger.record(Violation::new(RuleId::new("spin", "double unlock"), "free"));

        assert!(!ledger.is_clean());
        assert_eq!(ledger.records().len(), 2);
        assert_eq!(ledger.first().unwrap().rule.rule, "double lock");
    }

    #[test]
    fn reset_clears_records() {
        let mut ledger = ViolationLedger::new();
        ledger.record(Violation::new(RuleId::new("fd", "close free slot"), "slot 3"));
        ledger.reset();
        assert!(ledger.is_clean());
        assert!(ledger.first().is_none());
    }

    #[test]
    fn violation_serializes_with_rule_tag() {
        let v = Violation::new(RuleId::new("rcu", "unbalanced unlock"), "depth 0");
        let json = serde_json::to_value(&v).expect("serialize violation");
        assert_eq!(json["rule"]["subsystem"], "rcu");
        assert_eq!(json["detail"], "depth 0");
    }
}
