//! Configuration Module
//!
//! Typed configuration for the response cache, the rate tracker and the
//! quota policy, plus loading from environment variables for the binary.
//! The core types only ever receive the typed sections below.

use std::env;
use std::time::Duration;

use crate::error::{DreamError, Result};

// == Defaults ==
const DEFAULT_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_HIGH_WATER_MARK: usize = 100 * 1024 * 1024;
const DEFAULT_LOW_WATER_MARK: usize = 80 * 1024 * 1024;
const DEFAULT_CACHE_SWEEP_SECS: u64 = 60;
const DEFAULT_SHORT_WINDOW_SECS: u64 = 60;
const DEFAULT_LONG_WINDOW_SECS: u64 = 24 * 60 * 60;
const DEFAULT_RATE_SWEEP_MS: u64 = 1000;

// == Cache Config ==
/// Parameters of the response cache and its sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries older than this are removed by the next sweep
    pub max_age: Duration,
    /// Total body bytes above which a sweep starts size eviction
    pub high_water_mark: usize,
    /// Total body bytes a size eviction shrinks the cache down to
    pub low_water_mark: usize,
    /// Period of the background cache sweep
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Rejects watermarks that are inverted and zero durations.
    pub fn validate(&self) -> Result<()> {
        if self.low_water_mark > self.high_water_mark {
            return Err(DreamError::InvalidConfig(format!(
                "low_water_mark ({}) exceeds high_water_mark ({})",
                self.low_water_mark, self.high_water_mark
            )));
        }
        if self.max_age.is_zero() {
            return Err(DreamError::InvalidConfig(
                "max_age must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(DreamError::InvalidConfig(
                "cache sweep_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            low_water_mark: DEFAULT_LOW_WATER_MARK,
            sweep_interval: Duration::from_secs(DEFAULT_CACHE_SWEEP_SECS),
        }
    }
}

// == Rate Config ==
/// Window lengths of the rate tracker and the period of its sweep.
///
/// The short window backs the per-minute quotas and the long window the
/// per-day quotas, for both requests and tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateConfig {
    pub short_window: Duration,
    pub long_window: Duration,
    pub sweep_interval: Duration,
}

impl RateConfig {
    /// Rejects zero-length windows and a zero sweep period.
    pub fn validate(&self) -> Result<()> {
        if self.short_window.is_zero() || self.long_window.is_zero() {
            return Err(DreamError::InvalidConfig(
                "rate windows must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(DreamError::InvalidConfig(
                "rate sweep_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            short_window: Duration::from_secs(DEFAULT_SHORT_WINDOW_SECS),
            long_window: Duration::from_secs(DEFAULT_LONG_WINDOW_SECS),
            sweep_interval: Duration::from_millis(DEFAULT_RATE_SWEEP_MS),
        }
    }
}

// == Quota Limits ==
/// Thresholds at which the system reports itself rate limited.
///
/// A window is exceeded once its total reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub requests_per_minute: u64,
    pub requests_per_day: u64,
    pub tokens_per_minute: u64,
    pub tokens_per_day: u64,
}

impl QuotaLimits {
    /// Rejects zero thresholds, which would leave the system rate limited
    /// before its first request.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("requests_per_minute", self.requests_per_minute),
            ("requests_per_day", self.requests_per_day),
            ("tokens_per_minute", self.tokens_per_minute),
            ("tokens_per_day", self.tokens_per_day),
        ];
        for (name, value) in thresholds {
            if value == 0 {
                return Err(DreamError::InvalidConfig(format!(
                    "quota {} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            requests_per_day: 14_400,
            tokens_per_minute: 5_000,
            tokens_per_day: 500_000,
        }
    }
}

// == Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Response cache parameters
    pub cache: CacheConfig,
    /// Rate tracker parameters
    pub rate: RateConfig,
    /// Quota thresholds
    pub quota: QuotaLimits,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_AGE_SECS` - Maximum entry age (default: 86400)
    /// - `CACHE_HIGH_WATER_MARK` - Bytes that trigger size eviction (default: 100 MiB)
    /// - `CACHE_LOW_WATER_MARK` - Bytes size eviction shrinks to (default: 80 MiB)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Cache sweep period (default: 60)
    /// - `RATE_SHORT_WINDOW_SECS` - Per-minute window length (default: 60)
    /// - `RATE_LONG_WINDOW_SECS` - Per-day window length (default: 86400)
    /// - `RATE_SWEEP_INTERVAL_MS` - Rate sweep period (default: 1000)
    /// - `QUOTA_REQUESTS_PER_MINUTE` (default: 30)
    /// - `QUOTA_REQUESTS_PER_DAY` (default: 14400)
    /// - `QUOTA_TOKENS_PER_MINUTE` (default: 5000)
    /// - `QUOTA_TOKENS_PER_DAY` (default: 500000)
    pub fn from_env() -> Self {
        let quota = QuotaLimits::default();

        Self {
            server_port: env_or("PORT", 3000),
            cache: CacheConfig {
                max_age: Duration::from_secs(env_or("CACHE_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)),
                high_water_mark: env_or("CACHE_HIGH_WATER_MARK", DEFAULT_HIGH_WATER_MARK),
                low_water_mark: env_or("CACHE_LOW_WATER_MARK", DEFAULT_LOW_WATER_MARK),
                sweep_interval: Duration::from_secs(env_or(
                    "CACHE_SWEEP_INTERVAL_SECS",
                    DEFAULT_CACHE_SWEEP_SECS,
                )),
            },
            rate: RateConfig {
                short_window: Duration::from_secs(env_or(
                    "RATE_SHORT_WINDOW_SECS",
                    DEFAULT_SHORT_WINDOW_SECS,
                )),
                long_window: Duration::from_secs(env_or(
                    "RATE_LONG_WINDOW_SECS",
                    DEFAULT_LONG_WINDOW_SECS,
                )),
                sweep_interval: Duration::from_millis(env_or(
                    "RATE_SWEEP_INTERVAL_MS",
                    DEFAULT_RATE_SWEEP_MS,
                )),
            },
            quota: QuotaLimits {
                requests_per_minute: env_or("QUOTA_REQUESTS_PER_MINUTE", quota.requests_per_minute),
                requests_per_day: env_or("QUOTA_REQUESTS_PER_DAY", quota.requests_per_day),
                tokens_per_minute: env_or("QUOTA_TOKENS_PER_MINUTE", quota.tokens_per_minute),
                tokens_per_day: env_or("QUOTA_TOKENS_PER_DAY", quota.tokens_per_day),
            },
        }
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.rate.validate()?;
        self.quota.validate()
    }
}

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or unparseable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
