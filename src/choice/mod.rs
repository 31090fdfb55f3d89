//! Nondeterministic choice abstraction for contract monitors.
//!
//! Every monitor hook that models a fallible or unconstrained kernel
//! behavior draws its outcome from a [`ChoiceSource`]. A verifier backend
//! supplies a symbolic source; tests supply a seeded deterministic source or
//! a scripted one with pinned outcomes.

pub mod det_rng;

pub use det_rng::DetRng;

use std::collections::VecDeque;

/// Core trait for choice providers.
///
/// Implementations stand in for "any value the real kernel could produce
/// here". No correlation is promised between successive draws.
pub trait ChoiceSource: Send + 'static {
    /// Returns the next unconstrained `u64`.
    fn next_u64(&mut self) -> u64;

    /// Returns the next unconstrained boolean.
    fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// Stable identifier for tracing and diagnostics.
    fn source_id(&self) -> &'static str;
}

/// Seeded deterministic choice source.
///
/// Same seed, same run. This is the default source for scenario tests and
/// seed sweeps.
#[derive(Debug)]
pub struct DetChoices {
    rng: DetRng,
}

impl DetChoices {
    /// Creates a deterministic choice source from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            rng: DetRng::new(seed),
        }
    }
}

impl ChoiceSource for DetChoices {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn next_bool(&mut self) -> bool {
        self.rng.next_bool()
    }

    fn source_id(&self) -> &'static str {
        "deterministic"
    }
}

/// Scripted choice source with a fixed queue of values.
///
/// Unit tests use this to pin a hook's outcome (e.g. force an allocation
/// failure). When the script is exhausted, every further draw is zero,
/// which monitors interpret as the "success" branch.
#[derive(Debug, Default)]
pub struct ScriptedChoices {
    script: VecDeque<u64>,
}

impl ScriptedChoices {
    /// Creates a scripted source from a value sequence.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            script: values.into_iter().collect(),
        }
    }

    /// Number of scripted values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ChoiceSource for ScriptedChoices {
    fn next_u64(&mut self) -> u64 {
        self.script.pop_front().unwrap_or(0)
    }

    fn source_id(&self) -> &'static str {
        "scripted"
    }
}
