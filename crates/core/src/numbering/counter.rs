//! Counter store abstraction.

use std::future::Future;

use super::error::NumberingError;

/// Shared counters keyed by name.
///
/// Both operations are a single atomic read-modify-write: two concurrent
/// callers on the same key never observe the same value.
pub trait CounterStore: Send + Sync {
    /// Increments the counter and returns the new value (first call returns 1).
    fn increment(&self, key: &str) -> impl Future<Output = Result<u64, NumberingError>> + Send;

    /// Sets the counter to `max(current, floor) + 1` and returns it.
    fn increment_from(
        &self,
        key: &str,
        floor: u64,
    ) -> impl Future<Output = Result<u64, NumberingError>> + Send;
}
