//! The interceptor layer: bearer injection, auth-failure classification,
//! and the single renewal-driven retry.
//!
//! Every outbound call flows through [`HttpClient::execute`]:
//!
//! 1. The current bearer token is resolved and attached.
//! 2. A response with status in {401, 419, 440} on a request that has not
//!    opted out and has retry budget left triggers exactly one renewal via
//!    the shared coordinator, then the original request is re-issued
//!    unchanged.
//! 3. If the renewal fails, a `SessionExpired` event is published and the
//!    original HTTP error propagates untouched.
//!
//! The retry budget is an explicit counter threaded through the loop;
//! requests are never marked by mutation, so a request value can be reused
//! safely.

use opsboard_core::error::is_auth_status;
use opsboard_core::providers::{ApiRequest, HttpTransport};
use opsboard_core::{Result, SessionError, SessionEvent, SessionEvents, TokenResolver};
use opsboard_runtime::RefreshCoordinator;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP client wrapping a transport with the auth-retry interceptor.
///
/// Cheap to clone. Independent clients (general-purpose, dashboard) each
/// enforce their own per-request retry cap but share the same coordinator,
/// so renewal is never duplicated across clients.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<TokenResolver>,
    coordinator: Arc<RefreshCoordinator>,
    events: SessionEvents,
}

impl HttpClient {
    /// Create a client over the given transport and shared services.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        resolver: Arc<TokenResolver>,
        coordinator: Arc<RefreshCoordinator>,
        events: SessionEvents,
    ) -> Self {
        Self {
            transport,
            resolver,
            coordinator,
            events,
        }
    }

    /// Execute a request and parse the JSON response body.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Network`] when no response was produced.
    /// - [`SessionError::Http`] for non-success statuses, including an
    ///   authentication failure that survived the single retry.
    /// - [`SessionError::Decode`] when a success body is not valid JSON.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        // Explicit retry budget instead of a mutated request marker.
        let mut retries_left: u8 = u8::from(request.auth_retry);

        loop {
            let mut attempt = request.clone();
            attempt.bearer = self.resolver.resolve();

            let response = self.transport.send(attempt).await?;
            if response.is_success() {
                return response.json();
            }

            let error = SessionError::Http {
                status: response.status,
                message: response.body,
            };

            if is_auth_status(response.status) && retries_left > 0 {
                retries_left -= 1;
                debug!(
                    status = response.status,
                    path = %request.path,
                    "authentication failure, renewing credential"
                );
                match self.coordinator.refresh().await {
                    Ok(()) => continue,
                    Err(refresh_error) => {
                        warn!(
                            error = %refresh_error,
                            "credential renewal failed, broadcasting session expiry"
                        );
                        self.events.publish(SessionEvent::SessionExpired);
                        return Err(error);
                    }
                }
            }

            return Err(error);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use opsboard_core::CredentialStore;
    use opsboard_core::credentials::keys;
    use opsboard_testing::mocks::{MemoryCredentialStore, MockHttpTransport, MockRefresher};
    use serde_json::json;

    struct Harness {
        transport: MockHttpTransport,
        refresher: MockRefresher,
        store: MemoryCredentialStore,
        events: SessionEvents,
        client: HttpClient,
    }

    fn harness() -> Harness {
        let transport = MockHttpTransport::new();
        let refresher = MockRefresher::new();
        let store = MemoryCredentialStore::new();
        let events = SessionEvents::default();
        let resolver = Arc::new(TokenResolver::standard(Arc::new(store.clone()) as Arc<dyn CredentialStore>));
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(refresher.clone())));
        let client = HttpClient::new(
            Arc::new(transport.clone()),
            resolver,
            coordinator,
            events.clone(),
        );
        Harness {
            transport,
            refresher,
            store,
            events,
            client,
        }
    }

    #[tokio::test]
    async fn test_success_passes_through_with_bearer() {
        let h = harness();
        h.store.set(keys::ACCESS_TOKEN, "tok-1");
        h.transport.push_json(200, &json!({"ok": true}));

        let value = h
            .client
            .execute(ApiRequest::get("/dashboard/stats"))
            .await
            .expect("success");

        assert_eq!(value, json!({"ok": true}));
        let sent = h.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bearer.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_auth_failure_renews_once_and_reissues_the_request() {
        let h = harness();
        h.store.set(keys::ACCESS_TOKEN, "stale");
        h.transport.push_response(401, "expired");
        h.transport.push_json(200, &json!({"ok": true}));

        let value = h
            .client
            .execute(ApiRequest::get("/dashboard/stats"))
            .await
            .expect("recovered");

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(h.refresher.calls(), 1);
        assert_eq!(h.transport.calls(), 2);
        // Re-issued unchanged apart from the bearer.
        let sent = h.transport.sent();
        assert_eq!(sent[0].path, sent[1].path);
        assert_eq!(sent[0].query, sent[1].query);
    }

    #[tokio::test]
    async fn test_second_auth_failure_propagates_without_second_renewal() {
        let h = harness();
        h.transport.push_response(401, "expired");
        h.transport.push_response(401, "still expired");

        let error = h
            .client
            .execute(ApiRequest::get("/dashboard/stats"))
            .await
            .expect_err("second 401 must fail");

        assert_eq!(
            error,
            SessionError::Http {
                status: 401,
                message: "still expired".to_string()
            }
        );
        // Exactly one renewal for the request, never two.
        assert_eq!(h.refresher.calls(), 1);
        assert_eq!(h.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_opt_out_marker_bypasses_renewal() {
        let h = harness();
        h.transport.push_response(401, "expired");

        let error = h
            .client
            .execute(ApiRequest::post("/auth/logout").no_auth_retry())
            .await
            .expect_err("must fail");

        assert!(matches!(error, SessionError::Http { status: 401, .. }));
        assert_eq!(h.refresher.calls(), 0);
        assert_eq!(h.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_renewal_broadcasts_expiry_and_keeps_original_error() {
        let h = harness();
        let mut events = h.events.subscribe();
        h.transport.push_response(419, "token expired");
        h.refresher.push_outcome(Err(SessionError::RefreshFailed {
            reason: "grant revoked".to_string(),
        }));

        let error = h
            .client
            .execute(ApiRequest::get("/dashboard/stats"))
            .await
            .expect_err("must fail");

        // Original error untouched, not the refresh error.
        assert_eq!(
            error,
            SessionError::Http {
                status: 419,
                message: "token expired".to_string()
            }
        );
        assert_eq!(events.try_recv().expect("event"), SessionEvent::SessionExpired);
        assert_eq!(h.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_business_errors_are_never_intercepted() {
        let h = harness();
        h.transport.push_response(422, r#"{"field":"email"}"#);

        let error = h
            .client
            .execute(ApiRequest::post("/employees").json(json!({"email": ""})))
            .await
            .expect_err("validation error");

        assert_eq!(
            error,
            SessionError::Http {
                status: 422,
                message: r#"{"field":"email"}"#.to_string()
            }
        );
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_clients_share_one_coordinator() {
        // Two independent clients over one coordinator: concurrent auth
        // failures trigger a single renewal exchange.
        let transport = MockHttpTransport::new().with_delay(tokio::time::Duration::from_millis(5));
        let refresher = MockRefresher::new().with_delay(tokio::time::Duration::from_millis(20));
        let store = MemoryCredentialStore::new();
        let events = SessionEvents::default();
        let resolver = Arc::new(TokenResolver::standard(
            Arc::new(store.clone()) as Arc<dyn CredentialStore>
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(refresher.clone())));

        let general = HttpClient::new(
            Arc::new(transport.clone()),
            Arc::clone(&resolver),
            Arc::clone(&coordinator),
            events.clone(),
        );
        let domain = HttpClient::new(
            Arc::new(transport.clone()),
            resolver,
            coordinator,
            events,
        );

        transport.push_response(401, "expired");
        transport.push_response(401, "expired");
        transport.push_json(200, &json!(1));
        transport.push_json(200, &json!(2));

        tokio::time::pause();
        let (a, b) = tokio::join!(
            general.execute(ApiRequest::get("/a")),
            domain.execute(ApiRequest::get("/b")),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(refresher.calls(), 1);
    }
}
