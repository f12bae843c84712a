//! # Opsboard Testing
//!
//! Mock providers and fixtures for the opsboard session layer.
//!
//! Every provider trait in `opsboard-core` has an in-memory mock here:
//! scripted outcomes, call counters, and recorded inputs, so session logic
//! tests run at memory speed with no network.
//!
//! ## Example
//!
//! ```ignore
//! use opsboard_testing::mocks::{MockAuthApi, MemoryCredentialStore};
//!
//! #[tokio::test]
//! async fn test_login_flow() {
//!     let auth = MockAuthApi::new();
//!     auth.push_identity(Ok(opsboard_testing::fixtures::user("dana")));
//!     // ... build a SessionManager over the mocks and drive it
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod fixtures;
pub mod mocks;

/// Install a `tracing` subscriber printing to the test output.
///
/// Safe to call from several tests; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
