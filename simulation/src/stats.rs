//! Population statistics and viability
//!
//! After every step the world can describe itself as a `PopulationSnapshot`.
//! A `ViabilityReporter` looks at that snapshot and decides whether the run
//! should keep going.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::components::DeathCause;
use crate::environment::{TimeOfDay, Weather};

/// Live counts per species plus the environment at the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub step: u64,
    /// Every registered species appears, including extinct ones.
    pub counts: BTreeMap<String, usize>,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

impl PopulationSnapshot {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, species: &str) -> usize {
        self.counts.get(species).copied().unwrap_or(0)
    }

    pub fn surviving_species(&self) -> usize {
        self.counts.values().filter(|n| **n > 0).count()
    }
}

/// Deaths in one step, by cause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathTally {
    counts: BTreeMap<DeathCause, u32>,
}

impl DeathTally {
    pub fn record(&mut self, cause: DeathCause) {
        *self.counts.entry(cause).or_default() += 1;
    }

    pub fn get(&self, cause: DeathCause) -> u32 {
        self.counts.get(&cause).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Decides whether a run should continue.
pub trait ViabilityReporter {
    fn is_viable(&mut self, snapshot: &PopulationSnapshot) -> bool;
}

impl<F> ViabilityReporter for F
where
    F: FnMut(&PopulationSnapshot) -> bool,
{
    fn is_viable(&mut self, snapshot: &PopulationSnapshot) -> bool {
        self(snapshot)
    }
}

/// Viable while at least two species are still alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldStats;

impl ViabilityReporter for FieldStats {
    fn is_viable(&mut self, snapshot: &PopulationSnapshot) -> bool {
        snapshot.surviving_species() > 1
    }
}

/// Never stops a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysViable;

impl ViabilityReporter for AlwaysViable {
    fn is_viable(&mut self, _snapshot: &PopulationSnapshot) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(counts: &[(&str, usize)]) -> PopulationSnapshot {
        PopulationSnapshot {
            step: 3,
            counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            time_of_day: TimeOfDay::Day,
            weather: Weather::Clear,
        }
    }

    #[test]
    fn test_field_stats_needs_two_species() {
        let mut stats = FieldStats;
        assert!(stats.is_viable(&snapshot(&[("plant", 4), ("dodo", 1)])));
        assert!(!stats.is_viable(&snapshot(&[("plant", 4), ("dodo", 0)])));
        assert!(!stats.is_viable(&snapshot(&[])));
    }

    #[test]
    fn test_closure_reporter() {
        let mut calls = 0;
        let mut reporter = |s: &PopulationSnapshot| {
            calls += 1;
            s.total() > 2
        };
        assert!(reporter.is_viable(&snapshot(&[("plant", 3)])));
        assert!(!reporter.is_viable(&snapshot(&[("plant", 1)])));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_death_tally() {
        let mut tally = DeathTally::default();
        tally.record(DeathCause::Eaten);
        tally.record(DeathCause::Eaten);
        tally.record(DeathCause::OldAge);
        assert_eq!(tally.get(DeathCause::Eaten), 2);
        assert_eq!(tally.get(DeathCause::Disease), 0);
        assert_eq!(tally.total(), 3);
    }
}
