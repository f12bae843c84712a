//! Mock implementations of the `opsboard-core` provider traits.
//!
//! All mocks use in-memory storage behind `Arc<Mutex<…>>`, are cheap to
//! clone (clones share state), and expose call counters so tests can assert
//! how much network work *would* have happened.

mod alert;
mod auth;
mod credentials;
mod http;
mod transport;

pub use alert::{FailingAlert, RecordingAlert};
pub use auth::{MockAuthApi, MockRefresher};
pub use credentials::MemoryCredentialStore;
pub use http::MockHttpTransport;
pub use transport::{ConnectOutcome, MockLink, MockTransport};
