//! # Assessment Accumulator
//!
//! Per-run counters. Each pipeline invocation owns exactly one `Assessment`
//! and passes it by `&mut` to the code that inspects labels.
//!
//! ## Invariant
//!
//! `total == passed + sum(flag counts)` after every mutation. Nothing ever
//! decrements.

use super::flags::Flag;

/// Flag descriptions with their occurrence counts, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTally {
    entries: Vec<(String, u64)>,
}

impl FlagTally {
    fn increment(&mut self, description: String) {
        match self.entries.iter_mut().find(|(d, _)| *d == description) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((description, 1)),
        }
    }

    /// Count recorded for a description, or 0.
    pub fn get(&self, description: &str) -> u64 {
        self.entries
            .iter()
            .find(|(d, _)| d == description)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Number of distinct flags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn occurrences(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(d, c)| (d.as_str(), *c))
    }
}

/// Aggregate result of running one pipeline against one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    total: u64,
    passed: u64,
    flags: FlagTally,
}

impl Assessment {
    /// Create an empty assessment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label that passed every check.
    pub fn add_passed(&mut self) {
        self.passed += 1;
        self.total += 1;
        debug_assert!(self.is_consistent());
    }

    /// Record one occurrence of a flag.
    pub fn add_flag(&mut self, flag: Flag) {
        self.flags.increment(flag.to_string());
        self.total += 1;
        debug_assert!(self.is_consistent());
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn flags(&self) -> &FlagTally {
        &self.flags
    }

    /// Whether `total == passed + sum(flags)`.
    pub fn is_consistent(&self) -> bool {
        self.total == self.passed + self.flags.occurrences()
    }
}
