//! Rate Window Module
//!
//! A sliding-time-window log of weighted events.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

// == Rate Event ==
/// A weighted event recorded at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateEvent {
    at: Instant,
    weight: u64,
}

// == Rate Window ==
/// Event log whose total covers the trailing `window` of time.
///
/// Events are kept in non-decreasing timestamp order, so expired events
/// always form a prefix of the log.
#[derive(Debug)]
pub struct RateWindow {
    /// Length of the sliding window
    window: Duration,
    /// Recorded events, oldest first
    events: VecDeque<RateEvent>,
}

impl RateWindow {
    // == Constructor ==
    /// Creates an empty window of the given length.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: VecDeque::new(),
        }
    }

    // == Record ==
    /// Appends an event with `weight` stamped now.
    pub fn record(&mut self, weight: u64) {
        self.record_at(Instant::now(), weight);
    }

    /// Appends an event stamped `at`.
    ///
    /// A timestamp older than the newest event is raised to it, keeping the
    /// log ordered.
    pub fn record_at(&mut self, at: Instant, weight: u64) {
        let at = match self.events.back() {
            Some(last) if last.at > at => last.at,
            _ => at,
        };
        self.events.push_back(RateEvent { at, weight });
    }

    // == Current Total ==
    /// Sum of weights recorded within the trailing window.
    pub fn current_total(&self) -> u64 {
        self.total_at(Instant::now())
    }

    /// Sum of weights of events newer than `now - window`.
    ///
    /// Filters every event rather than relying on a prior sweep.
    pub fn total_at(&self, now: Instant) -> u64 {
        self.events
            .iter()
            .filter(|event| !self.is_expired(event, now))
            .map(|event| event.weight)
            .sum()
    }

    // == Sweep ==
    /// Drops expired events from the front of the log.
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drops the prefix of events at or before `now - window`, returning
    /// how many were removed.
    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let expired = self
            .events
            .iter()
            .take_while(|event| self.is_expired(event, now))
            .count();
        self.events.drain(..expired);
        expired
    }

    /// Number of events currently held, expired or not.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are held.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn is_expired(&self, event: &RateEvent, now: Instant) -> bool {
        now.saturating_duration_since(event.at) >= self.window
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_empty_window_total_is_zero() {
        let window = RateWindow::new(MINUTE);
        assert_eq!(window.current_total(), 0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_total_sums_weights() {
        let mut window = RateWindow::new(MINUTE);
        let start = Instant::now();

        window.record_at(start, 1);
        window.record_at(start, 250);
        window.record_at(start + Duration::from_secs(10), 4);

        assert_eq!(window.total_at(start + Duration::from_secs(10)), 255);
    }

    #[test]
    fn test_total_excludes_expired_without_sweep() {
        let mut window = RateWindow::new(MINUTE);
        let start = Instant::now();

        window.record_at(start, 5);
        window.record_at(start + Duration::from_secs(30), 7);

        // The first event sits exactly on the window edge and no longer counts
        assert_eq!(window.total_at(start + MINUTE), 7);
        assert_eq!(window.len(), 2);
        assert_eq!(window.total_at(start + Duration::from_secs(90)), 0);
    }

    #[test]
    fn test_sweep_removes_expired_prefix() {
        let mut window = RateWindow::new(MINUTE);
        let start = Instant::now();

        window.record_at(start, 1);
        window.record_at(start + Duration::from_secs(10), 1);
        window.record_at(start + Duration::from_secs(50), 1);

        let removed = window.sweep_at(start + Duration::from_secs(70));
        assert_eq!(removed, 2);
        assert_eq!(window.len(), 1);
        assert_eq!(window.total_at(start + Duration::from_secs(70)), 1);
    }

    #[test]
    fn test_sweep_twice_is_noop() {
        let mut window = RateWindow::new(MINUTE);
        let start = Instant::now();

        window.record_at(start, 3);
        let now = start + Duration::from_secs(120);
        assert_eq!(window.sweep_at(now), 1);
        assert_eq!(window.sweep_at(now), 0);
    }

    #[test]
    fn test_out_of_order_record_is_clamped() {
        let mut window = RateWindow::new(MINUTE);
        let start = Instant::now();

        window.record_at(start + Duration::from_secs(30), 1);
        window.record_at(start, 2);

        // The late event was stamped with the newer time, so it survives
        // alongside the first one
        let now = start + Duration::from_secs(75);
        assert_eq!(window.sweep_at(now), 0);
        assert_eq!(window.total_at(now), 3);
    }
}
