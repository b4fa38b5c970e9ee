//! Response DTOs for the dream cache API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::gateway::StatsSnapshot;
use crate::rate::LifetimeTotals;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Generation requests in the short window
    pub requests_last_minute: u64,
    /// Generation requests in the long window
    pub requests_last_day: u64,
    /// Tokens billed in the short window
    pub tokens_last_minute: u64,
    /// Tokens billed in the long window
    pub tokens_last_day: u64,
    /// Current number of cached responses
    pub cache_entries: usize,
    /// Sum of cached body sizes in bytes
    pub cache_bytes: usize,
    /// Whether new requests are currently refused
    pub rate_limited: bool,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            requests_last_minute: snapshot.totals.requests_last_minute,
            requests_last_day: snapshot.totals.requests_last_day,
            tokens_last_minute: snapshot.totals.tokens_last_minute,
            tokens_last_day: snapshot.totals.tokens_last_day,
            cache_entries: snapshot.cache.entries,
            cache_bytes: snapshot.cache.total_bytes,
            rate_limited: snapshot.rate_limited,
        }
    }
}

/// Response body for the metrics endpoint (GET /metrics)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    /// Generation requests since startup
    pub llm_requests_total: u64,
    /// Tokens billed since startup
    pub llm_tokens_total: u64,
}

impl From<LifetimeTotals> for MetricsResponse {
    fn from(totals: LifetimeTotals) -> Self {
        Self {
            llm_requests_total: totals.requests,
            llm_tokens_total: totals.tokens,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::rate::WindowTotals;

    #[test]
    fn test_stats_response_from_snapshot() {
        let snapshot = StatsSnapshot {
            totals: WindowTotals {
                requests_last_minute: 3,
                requests_last_day: 40,
                tokens_last_minute: 500,
                tokens_last_day: 9000,
            },
            cache: CacheStats {
                entries: 2,
                total_bytes: 128,
            },
            rate_limited: false,
        };

        let resp = StatsResponse::from(snapshot);
        assert_eq!(resp.requests_last_minute, 3);
        assert_eq!(resp.tokens_last_day, 9000);
        assert_eq!(resp.cache_bytes, 128);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["requests_last_day"], 40);
        assert_eq!(json["rate_limited"], false);
    }

    #[test]
    fn test_metrics_response_field_names() {
        let resp = MetricsResponse::from(LifetimeTotals {
            requests: 7,
            tokens: 1234,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["llm_requests_total"], 7);
        assert_eq!(json["llm_tokens_total"], 1234);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
