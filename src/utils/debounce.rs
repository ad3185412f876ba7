use std::time::{Duration, Instant};

/// Trailing-edge debouncer driven by explicit timestamps.
///
/// Each `signal` restarts the quiet period; `poll` reports `true` exactly once
/// after the period elapses without a new signal. The caller supplies the clock
/// so scroll and resize handlers stay deterministic.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_signal: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_signal: None,
        }
    }

    /// Quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a raw event, restarting the quiet period
    pub fn signal(&mut self, now: Instant) {
        self.last_signal = Some(now);
    }

    /// Whether a signal is waiting for its quiet period to elapse
    pub fn is_pending(&self) -> bool {
        self.last_signal.is_some()
    }

    /// Fire if the quiet period has elapsed since the latest signal
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_signal {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_signal = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending signal
    pub fn cancel(&mut self) {
        self.last_signal = None;
    }
}
