//! Session environment: the services the state machine depends on.
//!
//! Everything here is constructed once by the application context and
//! passed in explicitly, the replacement for process-wide singletons.
//! Tests build the same struct over the `opsboard-testing` mocks.

use opsboard_core::providers::AuthApi;
use opsboard_core::{CredentialStore, SessionEvents};
use opsboard_notify::ChannelManager;
use opsboard_runtime::RefreshCoordinator;
use std::sync::Arc;

/// External dependencies of the [`SessionManager`](crate::SessionManager).
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Canonical auth endpoints.
    pub auth: Arc<dyn AuthApi>,

    /// Persisted credential hints; cleared wholesale on sign-out.
    pub credentials: Arc<dyn CredentialStore>,

    /// The process-wide single-flight renewal coordinator.
    pub coordinator: Arc<RefreshCoordinator>,

    /// The notification channel whose lifecycle the machine owns.
    pub channel: Arc<ChannelManager>,

    /// The session event hub.
    pub events: SessionEvents,
}

impl SessionEnvironment {
    /// Create a session environment.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
        channel: Arc<ChannelManager>,
        events: SessionEvents,
    ) -> Self {
        Self {
            auth,
            credentials,
            coordinator,
            channel,
            events,
        }
    }
}
