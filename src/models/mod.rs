//! Response models for the dream cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies. Dreamed pages are served raw and have
//! no DTO.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, MetricsResponse, StatsResponse};
