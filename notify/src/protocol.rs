//! Notification channel wire protocol.
//!
//! Keepalive uses literal `"ping"`/`"pong"` text frames. Business messages
//! are JSON envelopes:
//!
//! ```json
//! { "type": "new_notification", "data": { ... } }
//! ```
//!
//! Malformed payloads are classified, never fatal: the caller discards them
//! and the connection stays open.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keepalive frame sent by the client.
pub const PING: &str = "ping";

/// Keepalive acknowledgement sent by the server.
pub const PONG: &str = "pong";

/// Envelope type for a new unread notification.
pub const NEW_NOTIFICATION: &str = "new_notification";

/// Typed envelope for business messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    /// Message type, e.g. `"new_notification"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload.
    #[serde(default)]
    pub data: Value,
}

/// Classification of one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Heartbeat acknowledgement; consumed silently.
    Pong,
    /// A well-formed business envelope.
    Envelope(PushEnvelope),
    /// Not a keepalive and not a well-formed envelope.
    Malformed(String),
}

/// Classify an inbound text frame.
#[must_use]
pub fn classify(text: &str) -> Inbound {
    if text == PONG {
        return Inbound::Pong;
    }
    match serde_json::from_str::<PushEnvelope>(text) {
        Ok(envelope) => Inbound::Envelope(envelope),
        Err(error) => Inbound::Malformed(error.to_string()),
    }
}
