//! Delay schedule for reconnection attempts.
//!
//! The notification channel waits before every reconnect. The default
//! schedule is a fixed delay (multiplier 1.0); deployments that want
//! exponential backoff raise the multiplier and the cap applies.

use tokio::time::Duration;

/// Delay schedule applied before retrying a failed connection.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Multiplier applied per attempt (1.0 = fixed delay).
    pub multiplier: f64,

    /// Upper bound for any computed delay.
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(3),
            multiplier: 1.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Fixed delay for every attempt.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
        }
    }

    /// Set the base delay.
    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the per-attempt multiplier.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry attempt `attempt` (0-based).
    ///
    /// `base_delay * multiplier^attempt`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.base_delay.min(self.max_delay);
        }

        let millis =
            (self.base_delay.as_millis() as f64) * self.multiplier.powi(attempt.min(1000) as i32);
        let delay = Duration::from_millis(millis as u64);

        delay.min(self.max_delay)
    }
}
