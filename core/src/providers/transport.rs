//! Notification channel transport abstraction.
//!
//! A successful connect yields the two halves of a text-framed,
//! bidirectional connection: a [`FrameSink`] the heartbeat writes to and a
//! [`FrameStream`] the read loop consumes. Splitting mirrors how the
//! underlying websocket is driven (one writer, one reader) and keeps the
//! channel manager's select loop free of aliasing.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// A frame on the notification channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Text frame: either a literal keepalive (`"ping"`/`"pong"`) or a JSON
    /// business envelope.
    Text(String),

    /// Close frame with the peer's close code, if it sent one.
    Close {
        /// Close code from the peer.
        code: Option<u16>,
    },
}

/// Writing half of a live connection.
pub trait FrameSink: Send {
    /// Send one frame.
    ///
    /// # Errors
    ///
    /// [`SessionError::Network`](crate::SessionError::Network) when the
    /// connection is no longer writable.
    fn send(&mut self, frame: Frame) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Reading half of a live connection.
pub trait FrameStream: Send {
    /// Await the next inbound frame.
    ///
    /// `None` means the peer went away without a close frame (abnormal
    /// closure).
    fn next(&mut self) -> Pin<Box<dyn Future<Output = Option<Result<Frame>>> + Send + '_>>;
}

/// Establishes notification connections.
pub trait NotificationTransport: Send + Sync {
    /// Open a connection, authenticating via the ambient credential or the
    /// explicit `token` fallback parameter.
    ///
    /// # Errors
    ///
    /// [`SessionError::ConnectFailed`](crate::SessionError::ConnectFailed)
    /// when the handshake does not complete.
    fn connect(
        &self,
        token: Option<String>,
    ) -> Pin<
        Box<dyn Future<Output = Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)>> + Send + '_>,
    >;
}
