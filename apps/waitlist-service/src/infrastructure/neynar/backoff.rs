//! Retry Backoff
//!
//! Exponential backoff with jitter for Neynar requests.

use std::time::Duration;

use rand::Rng;

use crate::infrastructure::config::RetrySettings;

/// Exponential backoff calculator.
#[derive(Debug)]
pub(super) struct ExponentialBackoff {
    pub(super) attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    pub(super) const fn new(config: &RetrySettings) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
            jitter_factor: config.jitter_factor,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are spent.
    pub(super) fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = self
            .current_backoff
            .mul_f64(self.multiplier)
            .min(self.max_backoff);

        Some(self.apply_jitter(backoff))
    }

    fn apply_jitter(&self, duration: Duration) -> Duration {
        if self.jitter_factor <= 0.0 {
            return duration;
        }

        let base_millis = duration.as_secs_f64() * 1000.0;
        let jitter_range = base_millis * self.jitter_factor;
        let jitter: f64 = rand::rng().random_range(-jitter_range..=jitter_range);
        Duration::from_secs_f64((base_millis + jitter).max(1.0) / 1000.0)
    }
}
