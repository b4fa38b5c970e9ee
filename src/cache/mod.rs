//! Cache Module
//!
//! Provides the response cache: entries bounded by age and by aggregate
//! body size, both enforced by a periodic sweep.

mod entry;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::{CacheEntry, CachedResponse};
pub use stats::{CacheStats, SweepReport};
pub use store::ResponseCache;

/// Cache handle shared between request handlers and the sweep task.
pub type SharedCache = Arc<RwLock<ResponseCache>>;
