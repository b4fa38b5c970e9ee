//! Dream Cache - A response cache and quota tracker for a metered generator
//!
//! Serves generated pages through the gateway, with background sweeps
//! keeping the cache and the rate windows bounded.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dream_cache::api::create_router;
use dream_cache::generator::PlaceholderGenerator;
use dream_cache::{spawn_cache_sweep, spawn_rate_sweep, AppState, Config};

/// Main entry point for the dream cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache, rate tracker and quota policy
/// 4. Start the cache and rate sweep tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, stop the sweeps and drain the server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dream_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dream Cache Server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        max_age_secs = config.cache.max_age.as_secs(),
        high_water_mark = config.cache.high_water_mark,
        low_water_mark = config.cache.low_water_mark,
        requests_per_minute = config.quota.requests_per_minute,
        tokens_per_day = config.quota.tokens_per_day,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config, Arc::new(PlaceholderGenerator))
        .context("invalid configuration")?;
    info!("Cache and rate tracker initialized");

    // Start background sweeps
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeps = vec![
        spawn_cache_sweep(
            state.gateway.cache(),
            config.cache.sweep_interval,
            shutdown_rx.clone(),
        ),
        spawn_rate_sweep(
            state.gateway.tracker(),
            config.rate.sweep_interval,
            shutdown_rx,
        ),
    ];
    info!("Background sweep tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    wait_for_sweeps(sweeps).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, tells the sweep tasks to stop and lets the server
/// drain in-flight requests.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if shutdown_tx.send(true).is_err() {
        warn!("Sweep tasks already stopped");
    }
}

async fn wait_for_sweeps(sweeps: Vec<JoinHandle<()>>) {
    for handle in sweeps {
        if let Err(err) = handle.await {
            warn!(error = %err, "Sweep task ended abnormally");
        }
    }
}
