//! Application context: production wiring of the session layer.
//!
//! One explicit construction site for every shared service: the refresh
//! coordinator, the event hub, the two HTTP clients, the notification
//! channel, held for the lifetime of the application run. Presentation
//! code receives the context and calls the documented entry points; nothing
//! reaches for ambient state.

use crate::environment::SessionEnvironment;
use crate::manager::SessionManager;
use anyhow::Context as _;
use opsboard_client::{DashboardApi, HttpClient, ReqwestTransport, RestAuthApi, RestRefresher};
use opsboard_core::providers::{AuthApi, HttpTransport, NotificationTransport, TracingAlert};
use opsboard_core::{CredentialStore, SessionEvents, TokenResolver};
use opsboard_notify::{ChannelConfig, ChannelManager, WsTransport};
use opsboard_runtime::{RefreshCoordinator, RequestCache};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Application-level configuration for the session layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// REST API base URL, e.g. `https://app.example.com/api`.
    pub api_base_url: String,

    /// Notification channel configuration.
    pub channel: ChannelConfig,

    /// TTL for cached dashboard reads.
    ///
    /// Default: 60 seconds
    pub cache_ttl: Duration,
}

impl AppConfig {
    /// Create a configuration for the given API base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>, channel: ChannelConfig) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            channel,
            cache_ttl: Duration::from_secs(60),
        }
    }

    /// Set the dashboard read cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// The long-lived application context.
pub struct AppContext {
    /// The session state machine.
    pub session: Arc<SessionManager>,

    /// General-purpose HTTP client for mutating calls; shares the renewal
    /// coordinator with everything else.
    pub api: HttpClient,

    /// Domain-specific dashboard client with cached reads.
    pub dashboard: DashboardApi,

    /// The session event hub; presentation subscribes here.
    pub events: SessionEvents,

    expiry_listener: JoinHandle<()>,
}

impl AppContext {
    /// Construct the production service graph.
    ///
    /// One coordinator is shared by both HTTP clients and the notification
    /// channel, so credential renewal is single-flighted process-wide.
    ///
    /// # Errors
    ///
    /// Configuration or TLS initialization failures.
    pub fn bootstrap(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        let events = SessionEvents::default();
        let resolver = Arc::new(TokenResolver::standard(Arc::clone(&credentials)));

        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::new(config.api_base_url.clone())
                .context("building the HTTP transport")?,
        );

        let refresher = RestRefresher::new(
            Arc::clone(&transport),
            Arc::clone(&credentials),
            Arc::clone(&resolver),
        );
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(refresher)));

        let api = HttpClient::new(
            Arc::clone(&transport),
            Arc::clone(&resolver),
            Arc::clone(&coordinator),
            events.clone(),
        );
        let dashboard_http = HttpClient::new(
            Arc::clone(&transport),
            Arc::clone(&resolver),
            Arc::clone(&coordinator),
            events.clone(),
        );
        let dashboard = DashboardApi::new(dashboard_http, RequestCache::new(config.cache_ttl));

        let ws: Arc<dyn NotificationTransport> = Arc::new(WsTransport::new(config.channel.url.clone()));
        let channel = Arc::new(ChannelManager::new(
            ws,
            Arc::clone(&coordinator),
            Arc::clone(&resolver),
            Arc::new(TracingAlert),
            events.clone(),
            config.channel,
        ));

        let auth: Arc<dyn AuthApi> = Arc::new(RestAuthApi::new(
            Arc::clone(&transport),
            Arc::clone(&credentials),
            Arc::clone(&resolver),
        ));

        let env = SessionEnvironment::new(auth, credentials, coordinator, channel, events.clone());
        let session = Arc::new(SessionManager::new(env));
        let expiry_listener = session.spawn_expiry_listener();

        Ok(Self {
            session,
            api,
            dashboard,
            events,
            expiry_listener,
        })
    }

    /// Tear the context down: stop the expiry listener and the channel.
    pub async fn shutdown(self) {
        self.session.logout().await;
        self.expiry_listener.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use opsboard_core::SessionStatus;
    use opsboard_testing::mocks::MemoryCredentialStore;

    #[tokio::test]
    async fn test_bootstrap_starts_idle() {
        let config = AppConfig::new(
            "https://app.example.com/api",
            ChannelConfig::new("wss://app.example.com/ws/notify"),
        )
        .with_cache_ttl(Duration::from_secs(30));

        let context = AppContext::bootstrap(config, Arc::new(MemoryCredentialStore::new()))
            .expect("bootstrap");

        assert_eq!(context.session.status(), SessionStatus::Idle);
        assert!(context.session.user().is_none());
        // No shutdown here: logout would issue a real network call.
        drop(context);
    }
}
