//! Cache Entry Module
//!
//! Defines the cached payload and the entry that wraps it with its
//! insertion time.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// == Cached Response ==
/// A generated response, stored so it can be re-served verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status to re-serve
    pub status: u16,
    /// Response body
    pub body: String,
    /// Extra headers to re-serve
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl CachedResponse {
    /// Creates a response with no extra headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header, returning the updated response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    // == Size ==
    /// Size used for watermark accounting: the body length in bytes.
    ///
    /// Status and headers are not counted.
    pub fn size_bytes(&self) -> usize {
        self.body.len()
    }
}

// == Cache Entry ==
/// A cached response together with the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored response, shared read-only with callers
    pub response: Arc<CachedResponse>,
    /// Insertion time, never updated after creation
    pub inserted_at: Instant,
}

impl CacheEntry {
    /// Creates an entry stamped with `inserted_at`.
    pub fn new(response: Arc<CachedResponse>, inserted_at: Instant) -> Self {
        Self {
            response,
            inserted_at,
        }
    }

    /// Age of the entry at `now`; zero if `now` precedes the insertion.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Is Older Than ==
    /// Returns true once the age strictly exceeds `max_age`.
    pub fn is_older_than(&self, max_age: Duration, now: Instant) -> bool {
        self.age(now) > max_age
    }

    /// Body size of the wrapped response.
    pub fn size_bytes(&self) -> usize {
        self.response.size_bytes()
    }
}
