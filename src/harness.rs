//! Deterministic scenario harness for driving monitor call sequences.
//!
//! The real harness generator and model-checking engine live outside this
//! crate; this module is their stand-in for tests: it sequences a scenario's
//! calls against a fresh [`MonitorSuite`] and [`Session`], runs the
//! final-state aggregation, and classifies the run.

use crate::session::{Infeasible, Session, Step};
use crate::suite::MonitorSuite;
use crate::violation::Violation;
use serde::Serialize;

/// Classification of one simulated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// No violation recorded; every monitor quiescent at the end.
    Clean,
    /// At least one contract violation was recorded.
    Violation,
    /// The path was discontinued by an assumption before completing.
    ///
    /// Infeasible runs skip final-state checks; a violation recorded on the
    /// feasible prefix still wins, since the error point itself was
    /// reachable.
    Infeasible,
}

/// Report for one simulated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Seed of the deterministic choice source, when one was used.
    pub seed: Option<u64>,
    /// Run classification. The first violation is definitive.
    pub verdict: Verdict,
    /// All recorded violations, in order.
    pub violations: Vec<Violation>,
}

impl RunReport {
    /// Returns true iff the run completed with no violation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.verdict == Verdict::Clean
    }

    /// The definitive (first) violation, if any.
    #[must_use]
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Renders the report as JSON for external triage tooling.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("run report serialization cannot fail")
    }
}

/// A scenario is the call sequence a simulated module performs in one run:
/// any `Fn(&mut MonitorSuite, &mut Session) -> Step<()>`.
fn run_with_session(
    mut cx: Session,
    seed: Option<u64>,
    scenario: &dyn Fn(&mut MonitorSuite, &mut Session) -> Step<()>,
) -> RunReport {
    let mut suite = MonitorSuite::new();
    suite.initialize();
    cx.initialize();

    let outcome = scenario(&mut suite, &mut cx);
    let infeasible = matches!(outcome, Err(Infeasible));
    if !infeasible {
        suite.check_final_state(&mut cx);
    }

    let violations = cx.ledger().records().to_vec();
    let verdict = if !violations.is_empty() {
        Verdict::Violation
    } else if infeasible {
        Verdict::Infeasible
    } else {
        Verdict::Clean
    };
    tracing::debug!(?seed, ?verdict, violations = violations.len(), "run complete");
    RunReport {
        seed,
        verdict,
        violations,
    }
}

/// Runs `scenario` once with a seeded deterministic choice source.
pub fn run_scenario<F>(seed: u64, scenario: F) -> RunReport
where
    F: Fn(&mut MonitorSuite, &mut Session) -> Step<()>,
{
    run_with_session(Session::deterministic(seed), Some(seed), &scenario)
}

/// Runs `scenario` once with a scripted choice source pinning every outcome.
pub fn run_scripted<F>(values: impl IntoIterator<Item = u64>, scenario: F) -> RunReport
where
    F: Fn(&mut MonitorSuite, &mut Session) -> Step<()>,
{
    run_with_session(Session::scripted(values), None, &scenario)
}

/// Runs `scenario` across a seed sweep, one fresh suite and session per
/// seed, in the lab tradition of exploring the choice space by reseeding.
pub fn run_seeds<F>(seeds: impl IntoIterator<Item = u64>, scenario: F) -> Vec<RunReport>
where
    F: Fn(&mut MonitorSuite, &mut Session) -> Step<()>,
{
    seeds
        .into_iter()
        .map(|seed| run_with_session(Session::deterministic(seed), Some(seed), &scenario))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_is_clean() {
        let report = run_scenario(42, |_suite, _cx| Ok(()));
        assert_eq!(report.verdict, Verdict::Clean);
        assert!(report.is_clean());
        assert_eq!(report.seed, Some(42));
    }

    #[test]
    fn leaked_lock_is_a_violation() {
        let report = run_scenario(42, |suite, cx| {
            suite.spin_lock(cx);
            Ok(())
        });
        assert_eq!(report.verdict, Verdict::Violation);
        assert_eq!(report.first_violation().unwrap().rule.subsystem, "spin");
    }

    #[test]
    fn assumption_failure_is_infeasible_not_violating() {
        let report = run_scenario(42, |_suite, cx| {
            cx.assume(false)?;
            Ok(())
        });
        assert_eq!(report.verdict, Verdict::Infeasible);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn prefix_violation_beats_later_infeasibility() {
        let report = run_scenario(42, |suite, cx| {
            suite.spin_unlock(cx);
            cx.assume(false)?;
            Ok(())
        });
        assert_eq!(report.verdict, Verdict::Violation);
    }

    #[test]
    fn seed_sweep_produces_one_report_per_seed() {
        let reports = run_seeds(0..8, |suite, cx| {
            if suite.spin_trylock(cx) {
                suite.spin_unlock(cx);
            }
            Ok(())
        });
        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(RunReport::is_clean));
    }

    #[test]
    fn report_json_carries_verdict_and_rules() {
        let report = run_scripted([], |suite, cx| {
            suite.rcu_read_unlock(cx);
            Ok(())
        });
        let json = report.to_json();
        assert_eq!(json["verdict"], "Violation");
        assert_eq!(json["violations"][0]["rule"]["subsystem"], "rcu");
    }
}
