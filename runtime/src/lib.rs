//! # Opsboard Runtime
//!
//! Coordination primitives for the opsboard session layer:
//!
//! - [`SingleFlight`](single_flight::SingleFlight): one in-flight execution
//!   shared by all concurrent callers.
//! - [`RefreshCoordinator`](coordinator::RefreshCoordinator): single-flight
//!   credential renewal; the one instance every HTTP client and the
//!   notification channel share.
//! - [`RequestCache`](cache::RequestCache): TTL cache composed with
//!   in-flight request coalescing for read requests.
//! - [`BackoffPolicy`](backoff::BackoffPolicy): delay schedule for channel
//!   reconnection attempts.
//!
//! Everything here is owned by a long-lived application context and passed
//! to consumers explicitly; there is no ambient module state.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod backoff;
pub mod cache;
pub mod coordinator;
pub mod single_flight;

pub use backoff::BackoffPolicy;
pub use cache::RequestCache;
pub use coordinator::RefreshCoordinator;
pub use single_flight::SingleFlight;
