//! Shared counter collection keyed by counter name.

use dashmap::DashMap;
use tallybook_core::numbering::{CounterStore, NumberingError};

/// Atomic counters.
///
/// Each increment runs under the entry's shard lock, so concurrent callers
/// never observe the same value.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: DashMap<String, u64>,
}

impl InMemoryCounterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of a counter.
    #[must_use]
    pub fn current(&self, key: &str) -> u64 {
        self.counters.get(key).map_or(0, |value| *value)
    }
}

impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, NumberingError> {
        let mut value = self.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn increment_from(&self, key: &str, floor: u64) -> Result<u64, NumberingError> {
        let mut value = self.counters.entry(key.to_string()).or_insert(0);
        *value = (*value).max(floor) + 1;
        Ok(*value)
    }
}
