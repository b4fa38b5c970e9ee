//! Background Tasks Module
//!
//! Periodic sweeps that run for the lifetime of the server.
//!
//! # Tasks
//! - Cache sweep: evicts old entries, then shrinks the cache to its low water mark
//! - Rate sweep: trims expired events from every rate window
//!
//! Both stop when `true` is sent on their shutdown channel or the sender
//! is dropped.

mod sweep;

pub use sweep::{spawn_cache_sweep, spawn_rate_sweep};
