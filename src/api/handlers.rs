//! API Handlers
//!
//! HTTP request handlers for the dream cache endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode, Uri},
    response::{Html, Response},
    Json,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{DreamError, Result};
use crate::gateway::{Gateway, StatsSnapshot};
use crate::generator::Generator;
use crate::models::{HealthResponse, MetricsResponse, StatsResponse};

/// Header telling clients whether the page came from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Quota check, cache and generator
    pub gateway: Gateway,
}

impl AppState {
    /// Creates a new AppState around an assembled gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache, the rate tracker and the quota policy from the
    /// Config, rejecting it if malformed.
    pub fn from_config(config: &Config, generator: Arc<dyn Generator>) -> Result<Self> {
        Ok(Self::new(Gateway::from_config(config, generator)?))
    }
}

/// Handler for every path not claimed by another route.
///
/// Serves the page for the request path from the cache, generating it on
/// a miss. Refused with 429 while any quota window is exhausted.
pub async fn dream_handler(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let path = uri.path();
    let served = state.gateway.serve(path).await?;
    let response = &served.response;

    let status = StatusCode::from_u16(response.status).map_err(|err| {
        DreamError::Internal(format!("invalid cached status {}: {}", response.status, err))
    })?;

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(
            CACHE_STATUS_HEADER,
            if served.cache_hit { "hit" } else { "miss" },
        );

    for (name, value) in &response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => warn!(path, header = %name, "Skipping invalid cached header"),
        }
    }

    let reply = builder
        .body(Body::from(response.body.clone()))
        .map_err(|err| DreamError::Internal(err.to_string()))?;

    info!(
        path,
        status = response.status,
        cache_hit = served.cache_hit,
        "Request handled"
    );

    Ok(reply)
}

/// Handler for GET /
///
/// Renders the index page with the four window totals. Never reaches the
/// generator, so it spends no quota and caches nothing.
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.gateway.snapshot().await))
}

fn render_index(snapshot: &StatsSnapshot) -> String {
    let totals = &snapshot.totals;
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>Dream Cache</title></head>\n\
         <body>\n\
         <h1>Dream Cache</h1>\n\
         <p>Ask for any path and a page will be dreamed up for it.</p>\n\
         <ul>\n\
         <li>Requests in the last minute: {}</li>\n\
         <li>Requests in the last day: {}</li>\n\
         <li>Tokens in the last minute: {}</li>\n\
         <li>Tokens in the last day: {}</li>\n\
         </ul>\n\
         </body>\n\
         </html>\n",
        totals.requests_last_minute,
        totals.requests_last_day,
        totals.tokens_last_minute,
        totals.tokens_last_day,
    )
}

/// Handler for GET /stats
///
/// Returns the quota window totals and the cache size.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.gateway.snapshot().await))
}

/// Handler for GET /metrics
///
/// Returns the lifetime request and token counters. Unlike the window
/// totals these never decrease.
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse::from(state.gateway.tracker().lifetime()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::PlaceholderGenerator;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default(), Arc::new(PlaceholderGenerator)).unwrap()
    }

    #[tokio::test]
    async fn test_dream_handler_miss_then_hit() {
        let state = test_state();

        let first = dream_handler(State(state.clone()), Uri::from_static("/foo"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_STATUS_HEADER], "miss");

        let second = dream_handler(State(state), Uri::from_static("/foo"))
            .await
            .unwrap();
        assert_eq!(second.headers()[CACHE_STATUS_HEADER], "hit");
        assert_eq!(
            second.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_dream_handler_ignores_query() {
        let state = test_state();

        dream_handler(State(state.clone()), Uri::from_static("/foo?a=1"))
            .await
            .unwrap();
        let second = dream_handler(State(state), Uri::from_static("/foo?b=2"))
            .await
            .unwrap();
        assert_eq!(second.headers()[CACHE_STATUS_HEADER], "hit");
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        dream_handler(State(state.clone()), Uri::from_static("/bar"))
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.requests_last_minute, 1);
        assert_eq!(response.cache_entries, 1);
        assert!(!response.rate_limited);
    }

    #[tokio::test]
    async fn test_index_handler_renders_totals_without_generating() {
        let state = test_state();
        dream_handler(State(state.clone()), Uri::from_static("/bar"))
            .await
            .unwrap();

        let Html(page) = index_handler(State(state.clone())).await;
        assert!(page.contains("Requests in the last minute: 1"));
        assert!(page.contains("Requests in the last day: 1"));
        assert!(page.contains("Tokens in the last minute: "));

        let snapshot = state.gateway.snapshot().await;
        assert_eq!(snapshot.totals.requests_last_minute, 1);
        assert_eq!(snapshot.cache.entries, 1);
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        let state = test_state();
        dream_handler(State(state.clone()), Uri::from_static("/bar"))
            .await
            .unwrap();
        dream_handler(State(state.clone()), Uri::from_static("/bar"))
            .await
            .unwrap();

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.llm_requests_total, 1);
        assert!(response.llm_tokens_total > 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
