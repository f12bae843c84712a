//! # Opsboard Session
//!
//! The session state machine of the opsboard dashboard client: the single
//! authoritative view of "who is logged in".
//!
//! - [`SessionManager`](manager::SessionManager): drives login, logout,
//!   and session checks; owns the notification channel's lifecycle; forces
//!   sign-out when a `SessionExpired` broadcast arrives.
//! - [`SessionEnvironment`](environment::SessionEnvironment): the
//!   explicitly constructed services the machine depends on. No ambient
//!   singletons: everything is built once by the application context and
//!   passed in, so tests substitute mocks freely.
//! - [`AppContext`](context::AppContext): production wiring over reqwest
//!   and tokio-tungstenite.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod context;
pub mod environment;
pub mod manager;

pub use context::{AppConfig, AppContext};
pub use environment::SessionEnvironment;
pub use manager::SessionManager;
