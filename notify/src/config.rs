//! Notification channel configuration.
//!
//! Values are provided by the application, not hardcoded at use sites.

use opsboard_runtime::BackoffPolicy;
use std::ops::RangeInclusive;
use tokio::time::Duration;

/// Close codes reserved by the server for auth-driven closures.
///
/// Mirrors the HTTP auth statuses in the websocket private-use range
/// (4401, 4419, 4440 all fall inside it).
pub const AUTH_CLOSE_CODES: RangeInclusive<u16> = 4400..=4499;

/// Notification channel configuration.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Websocket endpoint, e.g. `wss://app.example.com/ws/notify`.
    pub url: String,

    /// Interval between keepalive `"ping"` frames.
    ///
    /// Default: 30 seconds
    pub heartbeat_interval: Duration,

    /// Delay schedule before reconnecting after an abnormal closure.
    ///
    /// Default: fixed 3 seconds
    pub reconnect: BackoffPolicy,

    /// Short delay before reconnecting after a successful auth recovery.
    ///
    /// Default: 1 second
    pub auth_recovery_delay: Duration,

    /// Close-code range the server uses to signal an auth failure.
    ///
    /// Default: [`AUTH_CLOSE_CODES`]
    pub auth_close_codes: RangeInclusive<u16>,
}

impl ChannelConfig {
    /// Create a configuration for the given websocket endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heartbeat_interval: Duration::from_secs(30),
            reconnect: BackoffPolicy::default(),
            auth_recovery_delay: Duration::from_secs(1),
            auth_close_codes: AUTH_CLOSE_CODES,
        }
    }

    /// Set the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the reconnect delay schedule.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: BackoffPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the post-renewal reconnect delay.
    #[must_use]
    pub const fn with_auth_recovery_delay(mut self, delay: Duration) -> Self {
        self.auth_recovery_delay = delay;
        self
    }

    /// Set the reserved auth close-code range.
    #[must_use]
    pub const fn with_auth_close_codes(mut self, codes: RangeInclusive<u16>) -> Self {
        self.auth_close_codes = codes;
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new("ws://localhost:3000/ws/notify")
    }
}
