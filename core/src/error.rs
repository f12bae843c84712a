//! Error types for the session layer.
//!
//! The taxonomy is `Clone + PartialEq` on purpose: the refresh coordinator
//! and the request cache settle one outcome and hand the identical value
//! (success or failure) to every attached waiter.

use thiserror::Error;

/// Result type alias for session-layer operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Status codes the dashboard backend uses to signal an authentication
/// failure on an HTTP response.
pub const AUTH_FAILURE_STATUSES: [u16; 3] = [401, 419, 440];

/// Returns `true` if an HTTP status code signals an authentication failure.
#[must_use]
pub fn is_auth_status(status: u16) -> bool {
    AUTH_FAILURE_STATUSES.contains(&status)
}

/// Error taxonomy for session, request, and notification-channel failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Login was rejected by the server.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The current credential is no longer valid and could not be renewed.
    #[error("Session has expired")]
    SessionExpired,

    /// The renewal exchange itself failed.
    #[error("Credential renewal failed: {reason}")]
    RefreshFailed {
        /// Reason for failure.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Transport Errors
    // ═══════════════════════════════════════════════════════════

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, carried verbatim for the caller.
        message: String,
    },

    /// A response or push payload did not match the expected shape.
    #[error("Malformed payload: {0}")]
    Decode(String),

    // ═══════════════════════════════════════════════════════════
    // Notification Channel Errors
    // ═══════════════════════════════════════════════════════════

    /// The push connection could not be established.
    #[error("Notification connect failed: {0}")]
    ConnectFailed(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Invariant violation inside the session layer.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns `true` for authentication-class failures, the ones the
    /// refresh coordinator can potentially recover from.
    ///
    /// # Examples
    ///
    /// ```
    /// # use opsboard_core::SessionError;
    /// assert!(SessionError::Http { status: 401, message: String::new() }.is_auth_failure());
    /// assert!(SessionError::Http { status: 440, message: String::new() }.is_auth_failure());
    /// assert!(!SessionError::Http { status: 500, message: String::new() }.is_auth_failure());
    /// ```
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Http { status, .. } => is_auth_status(*status),
            Self::SessionExpired => true,
            _ => false,
        }
    }

    /// Returns `true` for transient transport failures: background fetches
    /// log these and move on without forcing a sign-out.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ConnectFailed(_))
    }
}
