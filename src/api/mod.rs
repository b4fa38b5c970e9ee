//! API Module
//!
//! HTTP handlers and routing for the dream cache.
//!
//! # Endpoints
//! - `GET /stats` - Quota window totals and cache size
//! - `GET /health` - Health check endpoint
//! - `GET /*` - Any other path is served through the gateway

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
