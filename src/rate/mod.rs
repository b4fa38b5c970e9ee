//! Rate Module
//!
//! Sliding-window counters for requests and tokens, and the quota policy
//! that reads them.

mod policy;
mod tracker;
mod window;


pub use policy::QuotaPolicy;
pub use tracker::{LifetimeTotals, RateTracker, Window, WindowTotals};
pub use window::RateWindow;
