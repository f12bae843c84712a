//! Session state machine flows over the mock providers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use opsboard_core::credentials::keys;
use opsboard_core::providers::Credentials;
use opsboard_core::{
    ChannelPhase, CredentialStore, SessionError, SessionEvent, SessionEvents, SessionStatus,
    TokenResolver,
};
use opsboard_notify::{ChannelConfig, ChannelManager};
use opsboard_runtime::RefreshCoordinator;
use opsboard_session::{SessionEnvironment, SessionManager};
use opsboard_testing::fixtures;
use opsboard_testing::mocks::{
    MemoryCredentialStore, MockAuthApi, MockRefresher, MockTransport, RecordingAlert,
};
use std::sync::Arc;
use tokio::time::{Duration, sleep};

struct Harness {
    auth: MockAuthApi,
    store: MemoryCredentialStore,
    refresher: MockRefresher,
    ws: MockTransport,
    channel: Arc<ChannelManager>,
    events: SessionEvents,
    manager: Arc<SessionManager>,
}

fn harness() -> Harness {
    opsboard_testing::init_tracing();
    let auth = MockAuthApi::new();
    let store = MemoryCredentialStore::new();
    let refresher = MockRefresher::new();
    let ws = MockTransport::new();
    let events = SessionEvents::default();

    let resolver = Arc::new(TokenResolver::standard(
        Arc::new(store.clone()) as Arc<dyn CredentialStore>
    ));
    let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(refresher.clone())));
    let channel = Arc::new(ChannelManager::new(
        Arc::new(ws.clone()),
        Arc::clone(&coordinator),
        resolver,
        Arc::new(RecordingAlert::new()),
        events.clone(),
        ChannelConfig::new("ws://test/ws/notify"),
    ));

    let env = SessionEnvironment::new(
        Arc::new(auth.clone()),
        Arc::new(store.clone()),
        coordinator,
        Arc::clone(&channel),
        events.clone(),
    );
    let manager = Arc::new(SessionManager::new(env));

    Harness {
        auth,
        store,
        refresher,
        ws,
        channel,
        events,
        manager,
    }
}

async fn settle() {
    sleep(Duration::from_millis(5)).await;
}

#[tokio::test(start_paused = true)]
async fn test_login_takes_identity_from_the_canonical_endpoint() {
    let h = harness();
    let identity = fixtures::user("Identity Endpoint");
    h.auth.push_identity(Ok(identity.clone()));
    let mut rx = h.events.subscribe();

    let user = h
        .manager
        .login(Credentials::new("dana@example.com", "hunter2"))
        .await
        .expect("login");

    // Role/identity come from the identity check, never the login payload.
    assert_eq!(user, identity);
    assert_eq!(h.auth.login_calls(), 1);
    assert_eq!(h.auth.identity_calls(), 1);
    assert_eq!(h.manager.status(), SessionStatus::Authenticated);
    assert_eq!(h.manager.user(), Some(identity.clone()));
    assert_eq!(
        rx.recv().await.expect("event"),
        SessionEvent::SignedIn { user: identity }
    );

    // The channel starts on the transition into Authenticated.
    settle().await;
    assert_eq!(h.ws.connects(), 1);
    assert_eq!(h.channel.phase(), ChannelPhase::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_login_clears_hints_and_stays_unauthenticated() {
    let h = harness();
    h.store.set(keys::LEGACY_TOKEN, "stale-hint");
    h.auth.push_login(Err(SessionError::InvalidCredentials));

    let error = h
        .manager
        .login(Credentials::new("dana@example.com", "wrong"))
        .await
        .expect_err("rejected");

    assert_eq!(error, SessionError::InvalidCredentials);
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
    assert!(h.store.is_empty());
    assert_eq!(h.auth.identity_calls(), 0, "no identity check after a failed login");

    settle().await;
    assert_eq!(h.ws.connects(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_login_with_failing_identity_check_propagates_and_clears() {
    let h = harness();
    h.auth.push_identity(Err(SessionError::Http {
        status: 500,
        message: "identity service down".to_string(),
    }));

    let error = h
        .manager
        .login(Credentials::new("dana@example.com", "hunter2"))
        .await
        .expect_err("check failed");

    assert!(matches!(error, SessionError::Http { status: 500, .. }));
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
    assert!(h.store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_logout_clears_locally_even_when_the_server_call_fails() {
    let h = harness();
    h.manager.login(Credentials::new("d@e.com", "pw")).await.expect("login");
    settle().await;
    assert_eq!(h.ws.connects(), 1);

    let mut rx = h.events.subscribe();
    h.store.set(keys::ACCESS_TOKEN, "tok-live");
    h.auth
        .push_logout(Err(SessionError::Network("connection reset".to_string())));
    h.manager.logout().await;

    // Unconditional local teardown, independent of the network outcome.
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
    assert!(h.manager.user().is_none());
    assert!(h.store.is_empty());
    assert_eq!(h.auth.logout_calls(), 1);
    assert_eq!(rx.recv().await.expect("event"), SessionEvent::SignedOut);

    // Observation window: the channel never reconnects after logout.
    sleep(Duration::from_secs(120)).await;
    assert_eq!(h.ws.connects(), 1);
    assert_eq!(h.channel.phase(), ChannelPhase::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_check_session_renews_once_and_recovers() {
    let h = harness();
    let identity = fixtures::user("Recovered");
    h.auth.push_identity(Err(SessionError::Http {
        status: 401,
        message: "expired".to_string(),
    }));
    h.auth.push_identity(Ok(identity.clone()));

    let user = h.manager.check_session(true).await.expect("recovered");

    assert_eq!(user, identity);
    assert_eq!(h.refresher.calls(), 1);
    assert_eq!(h.auth.identity_calls(), 2);
    assert_eq!(h.manager.status(), SessionStatus::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_check_session_without_renewal_fails_directly() {
    let h = harness();
    h.auth.push_identity(Err(SessionError::Http {
        status: 401,
        message: "expired".to_string(),
    }));

    let error = h.manager.check_session(false).await.expect_err("must fail");

    assert!(error.is_auth_failure());
    assert_eq!(h.refresher.calls(), 0);
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_failed_renewal_expires_the_session() {
    let h = harness();
    let mut rx = h.events.subscribe();
    h.store.set(keys::ACCESS_TOKEN, "stale");
    h.auth.push_identity(Err(SessionError::Http {
        status: 419,
        message: "expired".to_string(),
    }));
    h.refresher.push_outcome(Err(SessionError::RefreshFailed {
        reason: "grant revoked".to_string(),
    }));

    let error = h.manager.refresh_auth().await.expect_err("unrecoverable");

    // The original identity error propagates, not the renewal error.
    assert!(matches!(error, SessionError::Http { status: 419, .. }));
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
    assert!(h.store.is_empty());
    assert_eq!(rx.recv().await.expect("event"), SessionEvent::SessionExpired);
}

#[tokio::test(start_paused = true)]
async fn test_second_auth_failure_after_renewal_stops_the_recursion() {
    let h = harness();
    for _ in 0..2 {
        h.auth.push_identity(Err(SessionError::Http {
            status: 401,
            message: "expired".to_string(),
        }));
    }

    let error = h.manager.check_session(true).await.expect_err("must fail");

    assert!(error.is_auth_failure());
    // Exactly one renewal and exactly two identity fetches, never a loop.
    assert_eq!(h.refresher.calls(), 1);
    assert_eq!(h.auth.identity_calls(), 2);
    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_broadcast_forces_sign_out_from_any_state() {
    let h = harness();
    let _listener = h.manager.spawn_expiry_listener();
    h.manager.login(Credentials::new("d@e.com", "pw")).await.expect("login");
    settle().await;
    assert_eq!(h.channel.phase(), ChannelPhase::Connected);

    // An HTTP client whose renewal failed broadcasts expiry.
    h.events.publish(SessionEvent::SessionExpired);
    settle().await;

    assert_eq!(h.manager.status(), SessionStatus::Unauthenticated);
    assert!(h.manager.user().is_none());
    assert!(h.store.is_empty());
    assert_eq!(h.channel.phase(), ChannelPhase::Disconnected);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(h.ws.connects(), 1, "no reconnect after forced sign-out");
}

#[tokio::test(start_paused = true)]
async fn test_recheck_replaces_the_identity_snapshot_wholesale() {
    let h = harness();
    let first = fixtures::user("Before");
    let second = fixtures::user("After");
    h.auth.push_identity(Ok(first.clone()));
    h.auth.push_identity(Ok(second.clone()));

    h.manager.login(Credentials::new("d@e.com", "pw")).await.expect("login");
    assert_eq!(h.manager.user(), Some(first));

    let user = h.manager.check_session(false).await.expect("re-check");
    assert_eq!(user, second);
    assert_eq!(h.manager.user(), Some(second));

    // Still exactly one live channel task across both transitions.
    settle().await;
    assert_eq!(h.ws.connects(), 1);
}
