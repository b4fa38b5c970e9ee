//! Cache Statistics Module
//!
//! Read-only snapshots of the cache size and the outcome of a sweep.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time size of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of live entries
    pub entries: usize,
    /// Sum of body sizes of live entries
    pub total_bytes: usize,
}

// == Sweep Report ==
/// Outcome of one cache sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Entries removed for exceeding the maximum age
    pub age_evicted: usize,
    /// Entries removed to bring the cache under the low water mark
    pub size_evicted: usize,
    /// Entries left after the sweep
    pub remaining_entries: usize,
    /// Body bytes left after the sweep
    pub remaining_bytes: usize,
}

impl SweepReport {
    /// Total number of entries removed.
    pub fn evicted(&self) -> usize {
        self.age_evicted + self.size_evicted
    }

    /// Returns true when the sweep removed nothing.
    pub fn is_noop(&self) -> bool {
        self.evicted() == 0
    }
}
