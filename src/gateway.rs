//! Gateway Module
//!
//! Puts the quota check and the response cache in front of the generator:
//! quota check, then cache lookup, then generation on a miss, whose usage is
//! recorded and whose response is cached.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CachedResponse, ResponseCache, SharedCache};
use crate::config::Config;
use crate::error::{DreamError, Result};
use crate::generator::Generator;
use crate::rate::{QuotaPolicy, RateTracker, WindowTotals};

// == Served ==
/// A response handed back by the gateway.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Arc<CachedResponse>,
    /// True if no generation call was made
    pub cache_hit: bool,
}

// == Stats Snapshot ==
/// Read-only view of the quota windows and the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub totals: WindowTotals,
    pub cache: CacheStats,
    pub rate_limited: bool,
}

// == Gateway ==
/// Shared request flow. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Gateway {
    cache: SharedCache,
    tracker: Arc<RateTracker>,
    policy: QuotaPolicy,
    generator: Arc<dyn Generator>,
}

impl Gateway {
    /// Assembles a gateway from already-built parts.
    pub fn new(
        cache: SharedCache,
        tracker: Arc<RateTracker>,
        policy: QuotaPolicy,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            cache,
            tracker,
            policy,
            generator,
        }
    }

    /// Builds the cache, tracker and policy from configuration.
    pub fn from_config(config: &Config, generator: Arc<dyn Generator>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(RwLock::new(ResponseCache::new(config.cache.clone())?));
        let tracker = Arc::new(RateTracker::new(&config.rate)?);
        Ok(Self::new(
            cache,
            tracker,
            QuotaPolicy::new(config.quota),
            generator,
        ))
    }

    /// Shared cache handle, for the sweep task.
    pub fn cache(&self) -> SharedCache {
        Arc::clone(&self.cache)
    }

    /// Shared rate tracker, for the sweep task.
    pub fn tracker(&self) -> Arc<RateTracker> {
        Arc::clone(&self.tracker)
    }

    // == Serve ==
    /// Serves `key` from the cache, or generates and caches it.
    ///
    /// Rejected with `DreamError::RateLimited` while any quota window is
    /// exhausted, even if the key is cached.
    pub async fn serve(&self, key: &str) -> Result<Served> {
        let totals = self.tracker.totals().await;
        if let Some(window) = self.policy.exceeded(&totals) {
            warn!(path = key, window = %window, "Rate limited");
            return Err(DreamError::RateLimited(window.to_string()));
        }

        let cached = self.cache.read().await.get(key);
        if let Some(response) = cached {
            debug!(path = key, "Cache hit");
            return Ok(Served {
                response,
                cache_hit: true,
            });
        }

        debug!(path = key, "Cache miss, generating");
        let generation = self.generator.generate(key).await.map_err(|err| {
            warn!(path = key, error = %err, "Cannot generate response");
            err
        })?;

        self.tracker.record_request().await;
        self.tracker.record_tokens(generation.tokens_used).await;

        let response = Arc::new(generation.response);
        self.cache
            .write()
            .await
            .put_shared(key, Arc::clone(&response));

        info!(
            path = key,
            status = response.status,
            tokens = generation.tokens_used,
            "Generated response"
        );

        Ok(Served {
            response,
            cache_hit: false,
        })
    }

    // == Snapshot ==
    /// Current window totals, cache size and rate-limit state.
    pub async fn snapshot(&self) -> StatsSnapshot {
        let totals = self.tracker.totals().await;
        let cache = self.cache.read().await.stats();
        StatsSnapshot {
            totals,
            cache,
            rate_limited: self.policy.is_rate_limited(&totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, QuotaLimits};
    use crate::generator::Generation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and bills a fixed number of tokens.
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, key: &str) -> Result<Generation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Generation {
                response: CachedResponse::new(200, format!("<p>{}</p>", key)),
                tokens_used: 10,
            })
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _key: &str) -> Result<Generation> {
            Err(DreamError::Generation("upstream unavailable".to_string()))
        }
    }

    fn test_config() -> Config {
        Config {
            cache: CacheConfig {
                max_age: Duration::from_secs(3600),
                ..CacheConfig::default()
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let generator = Arc::new(CountingGenerator::default());
        let gateway = Gateway::from_config(&test_config(), generator.clone()).unwrap();

        let first = gateway.serve("/foo").await.unwrap();
        assert!(!first.cache_hit);

        let second = gateway.serve("/foo").await.unwrap();
        assert!(second.cache_hit);
        assert!(Arc::ptr_eq(&second.response, &first.response));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generation_records_usage() {
        let gateway =
            Gateway::from_config(&test_config(), Arc::new(CountingGenerator::default())).unwrap();

        gateway.serve("/a").await.unwrap();
        gateway.serve("/b").await.unwrap();
        gateway.serve("/a").await.unwrap();

        let snapshot = gateway.snapshot().await;
        assert_eq!(snapshot.totals.requests_last_minute, 2);
        assert_eq!(snapshot.totals.tokens_last_day, 20);
        assert_eq!(snapshot.cache.entries, 2);
        assert!(!snapshot.rate_limited);
    }

    #[tokio::test]
    async fn test_rate_limited_after_threshold() {
        let config = Config {
            quota: QuotaLimits {
                requests_per_minute: 2,
                ..QuotaLimits::default()
            },
            ..test_config()
        };
        let gateway = Gateway::from_config(&config, Arc::new(CountingGenerator::default())).unwrap();

        gateway.serve("/a").await.unwrap();
        gateway.serve("/b").await.unwrap();

        // Cached keys are refused too while the quota is exhausted
        let result = gateway.serve("/a").await;
        assert!(matches!(result, Err(DreamError::RateLimited(_))));
        assert!(gateway.snapshot().await.rate_limited);
    }

    #[tokio::test]
    async fn test_generation_failure_caches_nothing() {
        let gateway = Gateway::from_config(&test_config(), Arc::new(FailingGenerator)).unwrap();

        let result = gateway.serve("/broken").await;
        assert!(matches!(result, Err(DreamError::Generation(_))));

        let snapshot = gateway.snapshot().await;
        assert_eq!(snapshot.cache.entries, 0);
        assert_eq!(snapshot.totals.requests_last_minute, 0);
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid_config() {
        let mut config = test_config();
        config.cache.low_water_mark = config.cache.high_water_mark + 1;

        let result = Gateway::from_config(&config, Arc::new(CountingGenerator::default()));
        assert!(matches!(result, Err(DreamError::InvalidConfig(_))));
    }
}
