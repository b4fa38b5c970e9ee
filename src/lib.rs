//! Dream Cache - A response cache and quota tracker for a metered generator
//!
//! Fronts a slow, rate-limited content-generation call with a response
//! cache bounded by age and size, and with sliding-window request and token
//! quotas.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod models;
pub mod rate;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{DreamError, Result};
pub use gateway::Gateway;
pub use tasks::{spawn_cache_sweep, spawn_rate_sweep};
