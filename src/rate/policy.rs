//! Quota Policy Module
//!
//! Stateless decision over the four window totals.

use crate::config::QuotaLimits;
use crate::rate::{Window, WindowTotals};

// == Quota Policy ==
/// Decides whether the generation service may be called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaPolicy {
    limits: QuotaLimits,
}

impl QuotaPolicy {
    pub fn new(limits: QuotaLimits) -> Self {
        Self { limits }
    }

    /// Threshold configured for one window.
    pub fn threshold(&self, window: Window) -> u64 {
        match window {
            Window::RequestsPerMinute => self.limits.requests_per_minute,
            Window::RequestsPerDay => self.limits.requests_per_day,
            Window::TokensPerMinute => self.limits.tokens_per_minute,
            Window::TokensPerDay => self.limits.tokens_per_day,
        }
    }

    // == Exceeded ==
    /// First window whose total has reached its threshold, if any.
    pub fn exceeded(&self, totals: &WindowTotals) -> Option<Window> {
        Window::ALL
            .into_iter()
            .find(|window| totals.get(*window) >= self.threshold(*window))
    }

    /// Returns true if any window has reached its threshold.
    pub fn is_rate_limited(&self, totals: &WindowTotals) -> bool {
        self.exceeded(totals).is_some()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_totals_not_limited() {
        let policy = QuotaPolicy::default();
        assert!(!policy.is_rate_limited(&WindowTotals::default()));
    }

    #[test]
    fn test_requests_per_minute_boundary() {
        let policy = QuotaPolicy::default();
        let mut totals = WindowTotals {
            requests_last_minute: 29,
            requests_last_day: 29,
            ..WindowTotals::default()
        };
        assert!(!policy.is_rate_limited(&totals));

        totals.requests_last_minute = 30;
        assert_eq!(policy.exceeded(&totals), Some(Window::RequestsPerMinute));
    }

    #[test]
    fn test_each_default_threshold() {
        let policy = QuotaPolicy::default();
        let cases = [
            (
                WindowTotals {
                    requests_last_day: 14_400,
                    ..WindowTotals::default()
                },
                Window::RequestsPerDay,
            ),
            (
                WindowTotals {
                    tokens_last_minute: 5_000,
                    ..WindowTotals::default()
                },
                Window::TokensPerMinute,
            ),
            (
                WindowTotals {
                    tokens_last_day: 500_000,
                    ..WindowTotals::default()
                },
                Window::TokensPerDay,
            ),
        ];

        for (totals, expected) in cases {
            assert_eq!(policy.exceeded(&totals), Some(expected));
        }
    }

    #[test]
    fn test_custom_limits() {
        let policy = QuotaPolicy::new(QuotaLimits {
            requests_per_minute: 2,
            requests_per_day: 10,
            tokens_per_minute: 100,
            tokens_per_day: 1_000,
        });
        let totals = WindowTotals {
            requests_last_minute: 1,
            requests_last_day: 1,
            tokens_last_minute: 99,
            tokens_last_day: 99,
        };
        assert!(!policy.is_rate_limited(&totals));
        assert_eq!(policy.threshold(Window::TokensPerDay), 1_000);
    }
}
