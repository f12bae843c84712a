//! Provider traits for external dependencies.
//!
//! Providers are **interfaces**, not implementations. The session machine,
//! interceptor, and channel manager depend on these traits; the application
//! context provides concrete implementations. This enables:
//!
//! - **Testing**: in-memory mocks (deterministic, no network)
//! - **Production**: real services (reqwest, tokio-tungstenite)
//!
//! # Dyn Compatibility
//!
//! Async methods return explicit `Pin<Box<dyn Future>>` instead of
//! `async fn` so every provider can be held as `Arc<dyn …>` inside the
//! session environment. Implementations should clone what they need out of
//! `&self` before the `async move` block so the returned future only
//! borrows `self`.

pub mod alert;
pub mod auth;
pub mod http;
pub mod transport;

pub use alert::{AlertSink, TracingAlert};
pub use auth::{AuthApi, Credentials, TokenGrant, TokenRefresher};
pub use http::{ApiRequest, HttpMethod, HttpResponse, HttpTransport};
pub use transport::{Frame, FrameSink, FrameStream, NotificationTransport};
