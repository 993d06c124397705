//! Exponential backoff schedule
//!
//! Shared by the bulk loader's retry loop and the pipelines' idle and error
//! sleeps. Delays grow by a multiplier from an initial value up to a cap, and
//! can be jittered so that many entities backing off together spread out.

use rand::Rng;
use std::time::Duration;

/// Exponential backoff with optional equal jitter
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    jitter: bool,
    current: Duration,
}

impl ExponentialBackoff {
    /// Create a schedule starting at `initial` and capped at `max`
    ///
    /// A multiplier below 1.0 is treated as 1.0.
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            multiplier: multiplier.max(1.0),
            jitter: true,
            current: initial,
        }
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Return the next delay and grow the schedule
    ///
    /// With jitter, the returned delay is drawn uniformly from
    /// `[base / 2, base]`, so it never drops below half the scheduled value.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        let grown = (base.as_nanos() as f64 * self.multiplier).min(self.max.as_nanos() as f64);
        self.current = Duration::from_nanos(grown as u64);

        if !self.jitter || base.is_zero() {
            return base;
        }

        let half = base / 2;
        let spread = (base - half).as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=spread);
        half + Duration::from_millis(extra)
    }

    /// Return to the initial delay
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// The delay the next call to [`next_delay`](Self::next_delay) is based on
    pub fn current(&self) -> Duration {
        self.current
    }
}
