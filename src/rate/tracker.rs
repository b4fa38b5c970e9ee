//! Rate Tracker Module
//!
//! Four independent sliding windows counting requests and tokens sent to
//! the generation service.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::RateConfig;
use crate::error::Result;
use crate::rate::RateWindow;

// == Window ==
/// Identifies one of the tracked windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    RequestsPerMinute,
    RequestsPerDay,
    TokensPerMinute,
    TokensPerDay,
}

impl Window {
    /// Every tracked window, in reporting order.
    pub const ALL: [Window; 4] = [
        Window::RequestsPerMinute,
        Window::RequestsPerDay,
        Window::TokensPerMinute,
        Window::TokensPerDay,
    ];

    /// Stable snake_case name, used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::RequestsPerMinute => "requests_per_minute",
            Window::RequestsPerDay => "requests_per_day",
            Window::TokensPerMinute => "tokens_per_minute",
            Window::TokensPerDay => "tokens_per_day",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Window Totals ==
/// Totals of all four windows read at (nearly) the same moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowTotals {
    pub requests_last_minute: u64,
    pub requests_last_day: u64,
    pub tokens_last_minute: u64,
    pub tokens_last_day: u64,
}

impl WindowTotals {
    /// Total of a single window.
    pub fn get(&self, window: Window) -> u64 {
        match window {
            Window::RequestsPerMinute => self.requests_last_minute,
            Window::RequestsPerDay => self.requests_last_day,
            Window::TokensPerMinute => self.tokens_last_minute,
            Window::TokensPerDay => self.tokens_last_day,
        }
    }
}

// == Lifetime Totals ==
/// Requests and tokens recorded since the tracker was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifetimeTotals {
    pub requests: u64,
    pub tokens: u64,
}

// == Rate Tracker ==
/// Request and token counters over a short and a long sliding window.
///
/// Each window has its own lock. The clock is read while that lock is held,
/// so every log stays ordered even under concurrent recording. Two
/// monotonic counters run alongside the windows and are never swept.
#[derive(Debug)]
pub struct RateTracker {
    requests_per_minute: Mutex<RateWindow>,
    requests_per_day: Mutex<RateWindow>,
    tokens_per_minute: Mutex<RateWindow>,
    tokens_per_day: Mutex<RateWindow>,
    requests_total: AtomicU64,
    tokens_total: AtomicU64,
}

impl RateTracker {
    // == Constructor ==
    /// Creates empty windows sized by `config`.
    pub fn new(config: &RateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            requests_per_minute: Mutex::new(RateWindow::new(config.short_window)),
            requests_per_day: Mutex::new(RateWindow::new(config.long_window)),
            tokens_per_minute: Mutex::new(RateWindow::new(config.short_window)),
            tokens_per_day: Mutex::new(RateWindow::new(config.long_window)),
            requests_total: AtomicU64::new(0),
            tokens_total: AtomicU64::new(0),
        })
    }

    fn window_lock(&self, window: Window) -> &Mutex<RateWindow> {
        match window {
            Window::RequestsPerMinute => &self.requests_per_minute,
            Window::RequestsPerDay => &self.requests_per_day,
            Window::TokensPerMinute => &self.tokens_per_minute,
            Window::TokensPerDay => &self.tokens_per_day,
        }
    }

    async fn record(&self, window: Window, weight: u64) {
        self.window_lock(window).lock().await.record(weight);
    }

    // == Record ==
    /// Counts one request against both request windows.
    pub async fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.record(Window::RequestsPerMinute, 1).await;
        self.record(Window::RequestsPerDay, 1).await;
    }

    /// Counts `tokens` against both token windows.
    pub async fn record_tokens(&self, tokens: u64) {
        self.tokens_total.fetch_add(tokens, Ordering::Relaxed);
        self.record(Window::TokensPerMinute, tokens).await;
        self.record(Window::TokensPerDay, tokens).await;
    }

    // == Current Total ==
    /// Total of one window as of now.
    pub async fn current_total(&self, window: Window) -> u64 {
        self.window_lock(window).lock().await.current_total()
    }

    /// Totals of all four windows.
    pub async fn totals(&self) -> WindowTotals {
        WindowTotals {
            requests_last_minute: self.current_total(Window::RequestsPerMinute).await,
            requests_last_day: self.current_total(Window::RequestsPerDay).await,
            tokens_last_minute: self.current_total(Window::TokensPerMinute).await,
            tokens_last_day: self.current_total(Window::TokensPerDay).await,
        }
    }

    /// Lifetime counters. Unaffected by window expiry and sweeps.
    pub fn lifetime(&self) -> LifetimeTotals {
        LifetimeTotals {
            requests: self.requests_total.load(Ordering::Relaxed),
            tokens: self.tokens_total.load(Ordering::Relaxed),
        }
    }

    // == Sweep ==
    /// Trims expired events from every window, one lock at a time.
    ///
    /// Returns the number of events removed across all windows.
    pub async fn sweep(&self) -> usize {
        let mut removed = 0;
        for window in Window::ALL {
            removed += self.window_lock(window).lock().await.sweep();
        }
        removed
    }

    /// Number of events held by one window, expired or not.
    pub async fn backlog(&self, window: Window) -> usize {
        self.window_lock(window).lock().await.len()
    }
}
