//! # Opsboard Core
//!
//! Shared state types, error taxonomy, and provider traits for the opsboard
//! session and real-time-notification layer.
//!
//! This crate defines the vocabulary of the session layer:
//!
//! - [`Session`](state::Session) / [`User`](state::User): the authoritative
//!   "who is logged in" snapshot and its invariants.
//! - [`SessionError`](error::SessionError): one clonable error taxonomy so a
//!   single settled outcome can be shared with every coalesced waiter.
//! - [`SessionEvents`](events::SessionEvents): the explicit publish/subscribe
//!   hub dependents register interest on (there is no ambient global bus).
//! - [`providers`]: traits for every external dependency (auth endpoints,
//!   credential storage, HTTP transport, notification transport, alert cue),
//!   so production services and test mocks are interchangeable.
//!
//! Higher layers live in `opsboard-runtime` (coordination primitives),
//! `opsboard-client` (HTTP), `opsboard-notify` (push channel), and
//! `opsboard-session` (the state machine).

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod credentials;
pub mod error;
pub mod events;
pub mod notifications;
pub mod providers;
pub mod state;

pub use credentials::{CredentialStore, TokenResolver, TokenSource};
pub use error::{Result, SessionError};
pub use events::{SessionEvent, SessionEvents};
pub use notifications::{Notification, NotificationId};
pub use state::{ChannelPhase, Role, Session, SessionStatus, User, UserId};
