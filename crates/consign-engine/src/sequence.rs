//! # Contract Number Allocation
//!
//! Human-readable contract numbers (`CTR-{year}-{seq:06}`) come from an
//! atomic per-year counter rather than a live document count, so concurrent
//! creations can never mint the same number. The allocator is seeded from
//! persisted contracts at startup when a database is configured.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Atomic per-year sequence for human-readable contract numbers.
#[derive(Debug, Default)]
pub struct ContractNumberAllocator {
    counters: Mutex<HashMap<i32, u64>>,
}

impl ContractNumberAllocator {
    /// Create an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next contract number for the given year.
    pub fn next(&self, year: i32) -> String {
        let mut counters = self.counters.lock();
        let counter = counters.entry(year).or_insert(0);
        *counter += 1;
        format!("CTR-{year}-{:06}", counter)
    }

    /// Raise a year's counter to at least `value`. Used at hydration to
    /// resume numbering after existing contracts.
    pub fn seed(&self, year: i32, value: u64) {
        let mut counters = self.counters.lock();
        let counter = counters.entry(year).or_insert(0);
        if *counter < value {
            *counter = value;
        }
    }

    /// Parse the (year, sequence) out of a contract number, if well-formed.
    pub fn parse(number: &str) -> Option<(i32, u64)> {
        let rest = number.strip_prefix("CTR-")?;
        let (year, seq) = rest.split_once('-')?;
        Some((year.parse().ok()?, seq.parse().ok()?))
    }
}
