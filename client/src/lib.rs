//! # Opsboard Client
//!
//! HTTP clients for the opsboard session layer:
//!
//! - [`ReqwestTransport`](transport::ReqwestTransport): one wire exchange
//!   over `reqwest`.
//! - [`HttpClient`](http::HttpClient): the interceptor layer: bearer
//!   injection, auth-failure classification, at most one renewal-driven
//!   retry per request.
//! - [`RestAuthApi`](auth_api::RestAuthApi) / [`RestRefresher`](auth_api::RestRefresher)
//!   are the canonical auth endpoints and the renewal exchange.
//! - [`DashboardApi`](dashboard::DashboardApi): domain-specific data-fetch
//!   helpers with TTL caching and request deduplication.
//!
//! Several clients may exist side by side; they each enforce their own
//! per-request retry cap but share one
//! [`RefreshCoordinator`](opsboard_runtime::RefreshCoordinator), so renewal
//! itself is never duplicated.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod auth_api;
pub mod dashboard;
pub mod http;
pub mod transport;

pub use auth_api::{RestAuthApi, RestRefresher};
pub use dashboard::DashboardApi;
pub use http::HttpClient;
pub use transport::ReqwestTransport;
