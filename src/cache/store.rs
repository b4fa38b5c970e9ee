//! Cache Store Module
//!
//! Response cache keyed by request identifier, bounded by entry age and by
//! aggregate body size. Bounds are only enforced by `sweep`, never on `put`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, CachedResponse, SweepReport};
use crate::config::CacheConfig;
use crate::error::Result;

// == Response Cache ==
/// Response storage with age- and size-based sweeping.
#[derive(Debug)]
pub struct ResponseCache {
    /// Key to entry storage
    entries: HashMap<String, CacheEntry>,
    /// Age limit and watermarks
    config: CacheConfig,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates an empty cache, rejecting malformed configuration.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            config,
        })
    }

    // == Get ==
    /// Looks up a cached response.
    ///
    /// Has no side effects: entries past their maximum age stay visible
    /// until the next sweep removes them.
    pub fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.response))
    }

    // == Put ==
    /// Stores a response under `key`, replacing any previous entry and
    /// restarting its age.
    pub fn put(&mut self, key: impl Into<String>, response: CachedResponse) {
        self.put_shared(key, Arc::new(response));
    }

    /// Like `put`, but stores an already shared response without copying it.
    pub fn put_shared(&mut self, key: impl Into<String>, response: Arc<CachedResponse>) {
        self.insert_at(key.into(), response, Instant::now());
    }

    #[cfg(test)]
    pub(crate) fn put_at(&mut self, key: impl Into<String>, response: CachedResponse, now: Instant) {
        self.insert_at(key.into(), Arc::new(response), now);
    }

    fn insert_at(&mut self, key: String, response: Arc<CachedResponse>, now: Instant) {
        self.entries.insert(key, CacheEntry::new(response, now));
    }

    // == Remove ==
    /// Evicts a single entry. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Sweep ==
    /// Removes entries past the maximum age, then shrinks the cache to the
    /// low water mark if it is above the high water mark.
    pub fn sweep(&mut self) -> SweepReport {
        self.sweep_at(Instant::now())
    }

    /// Sweep evaluated as of `now`.
    ///
    /// The size pass removes entries in map iteration order, which is
    /// unspecified; recency plays no part in which entries go.
    pub fn sweep_at(&mut self, now: Instant) -> SweepReport {
        let max_age = self.config.max_age;

        // Age pass, summing the survivors as we go
        let mut age_evicted = 0;
        let mut total_bytes = 0;
        self.entries.retain(|_, entry| {
            if entry.is_older_than(max_age, now) {
                age_evicted += 1;
                false
            } else {
                total_bytes += entry.size_bytes();
                true
            }
        });

        // Size pass
        let mut size_evicted = 0;
        if total_bytes > self.config.high_water_mark {
            let mut to_free = total_bytes - self.config.low_water_mark;
            self.entries.retain(|_, entry| {
                if to_free == 0 {
                    return true;
                }
                let size = entry.size_bytes();
                to_free = to_free.saturating_sub(size);
                total_bytes -= size;
                size_evicted += 1;
                false
            });
        }

        let report = SweepReport {
            age_evicted,
            size_evicted,
            remaining_entries: self.entries.len(),
            remaining_bytes: total_bytes,
        };

        if report.is_noop() {
            debug!(entries = report.remaining_entries, "Cache sweep: nothing to evict");
        } else {
            info!(
                old_keys = age_evicted,
                garbage_keys = size_evicted,
                remaining_entries = report.remaining_entries,
                remaining_bytes = report.remaining_bytes,
                "Cleaned up cache"
            );
        }

        report
    }

    // == Stats ==
    /// Returns the current entry count and total body size.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            total_bytes: self.total_bytes(),
        }
    }

    /// Sum of body sizes of all entries, including ones awaiting age eviction.
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(CacheEntry::size_bytes).sum()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
