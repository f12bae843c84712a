//! # Opsboard Notify
//!
//! The real-time notification channel of the opsboard session layer: one
//! persistent, text-framed push connection with heartbeat keepalive and
//! auth-aware reconnection.
//!
//! - [`ChannelManager`](manager::ChannelManager): owns the single
//!   connection, the heartbeat, the unread counter, and the recovery
//!   policy. Its lifecycle is driven by the session state machine: started
//!   on sign-in, torn down synchronously on sign-out or expiry.
//! - [`protocol`]: the wire protocol: literal `"ping"`/`"pong"` keepalive
//!   frames and the `{ type, data }` business envelope.
//! - [`WsTransport`](ws::WsTransport): the tokio-tungstenite transport.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod manager;
pub mod protocol;
pub mod ws;

pub use config::ChannelConfig;
pub use manager::{ChannelManager, ChannelState};
pub use ws::WsTransport;
