//! The session state machine.
//!
//! Status transitions:
//!
//! ```text
//! Idle → Loading → { Authenticated, Unauthenticated }
//! Authenticated → Loading (re-check) → { Authenticated, Unauthenticated }
//! any state → Unauthenticated (SessionExpired broadcast)
//! ```
//!
//! The machine owns the notification channel's lifecycle: a transition
//! into `Authenticated` starts it, a transition into `Unauthenticated`
//! tears it down synchronously.

use crate::environment::SessionEnvironment;
use opsboard_core::providers::Credentials;
use opsboard_core::{Result, Session, SessionEvent, SessionStatus, User};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The single authoritative session view and its operations.
///
/// One instance per application run, shared as `Arc<SessionManager>`.
/// Presentation reads [`snapshot`](Self::snapshot) and subscribes to the
/// event hub; it never mutates session state directly.
pub struct SessionManager {
    env: SessionEnvironment,
    state: Mutex<Session>,
}

impl SessionManager {
    /// Create the machine in the `Idle` state.
    #[must_use]
    pub fn new(env: SessionEnvironment) -> Self {
        Self {
            env,
            state: Mutex::new(Session::idle()),
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.snapshot().status()
    }

    /// Identity snapshot, present only while authenticated.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.snapshot().user().cloned()
    }

    /// Log in and establish the authoritative identity.
    ///
    /// The login response is **not** trusted for identity: a successful
    /// exchange is immediately followed by a canonical identity check, so
    /// role and identity always come from the identity endpoint.
    ///
    /// # Errors
    ///
    /// The original login or identity-check error. Either failure clears
    /// persisted hints and leaves the session `Unauthenticated`.
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        info!("logging in");
        self.set_state(Session::loading());

        if let Err(error) = self.env.auth.login(credentials).await {
            warn!(%error, "login failed");
            self.clear_local();
            return Err(error);
        }

        // Fresh grant in hand; no renewal pass on the identity check.
        self.check_session(false).await
    }

    /// Log out.
    ///
    /// Local state is cleared synchronously and unconditionally (channel
    /// torn down, status `Unauthenticated`, hints removed) regardless of
    /// how the best-effort server invalidation call goes. That call opts
    /// out of the auth-retry interceptor, so teardown can never recurse
    /// into a renewal.
    pub async fn logout(&self) {
        info!("logging out");
        self.env.channel.disconnect();
        self.set_state(Session::unauthenticated());
        self.env.events.publish(SessionEvent::SignedOut);

        if let Err(error) = self.env.auth.logout().await {
            debug!(%error, "server-side logout failed (ignored)");
        }
        self.env.credentials.clear();
    }

    /// Fetch the current identity and settle the session state.
    ///
    /// On an authentication-class failure with `allow_refresh`, delegates
    /// exactly once to the refresh coordinator and retries the identity
    /// fetch with `allow_refresh = false`, so the renewal pass can never
    /// loop. Any failure at that point clears state and leaves the session
    /// `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// The identity-fetch error that ended the check.
    pub async fn check_session(&self, allow_refresh: bool) -> Result<User> {
        let mut allow_refresh = allow_refresh;
        loop {
            self.set_state(Session::loading());

            match self.env.auth.current_identity().await {
                Ok(user) => {
                    self.set_state(Session::authenticated(user.clone()));
                    self.env
                        .events
                        .publish(SessionEvent::SignedIn { user: user.clone() });
                    self.env.channel.connect();
                    return Ok(user);
                }
                Err(error) if error.is_auth_failure() && allow_refresh => {
                    debug!("identity fetch unauthorized, renewing credential");
                    allow_refresh = false;
                    if let Err(refresh_error) = self.env.coordinator.refresh().await {
                        warn!(%refresh_error, "renewal failed during session check");
                        self.expire_local();
                        return Err(error);
                    }
                }
                Err(error) if error.is_auth_failure() => {
                    warn!(%error, "session check failed after renewal");
                    self.expire_local();
                    return Err(error);
                }
                Err(error) => {
                    warn!(%error, "session check failed");
                    self.clear_local();
                    return Err(error);
                }
            }
        }
    }

    /// Public re-entry point after external events: a session check with
    /// one renewal pass allowed.
    ///
    /// # Errors
    ///
    /// See [`check_session`](Self::check_session).
    pub async fn refresh_auth(&self) -> Result<User> {
        self.check_session(true).await
    }

    /// Subscribe the machine to the event hub: a `SessionExpired`
    /// broadcast from any publisher (typically an HTTP client whose
    /// renewal failed) forces local sign-out.
    ///
    /// Returns the listener task handle; the application context keeps it
    /// for teardown.
    pub fn spawn_expiry_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut events = manager.env.events.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SessionExpired) => manager.handle_expiry(),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Forced sign-out on an expiry broadcast. Idempotent and synchronous:
    /// channel teardown and hint clearing happen before this returns.
    fn handle_expiry(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.status() == SessionStatus::Unauthenticated {
                return;
            }
            *state = Session::unauthenticated();
        }
        info!("session expired, forcing sign-out");
        self.env.credentials.clear();
        self.env.channel.disconnect();
    }

    /// Clear local state after an unrecoverable auth failure and tell the
    /// rest of the application.
    fn expire_local(&self) {
        self.clear_local();
        self.env.events.publish(SessionEvent::SessionExpired);
    }

    /// Clear local state without an expiry broadcast (plain failures,
    /// login rejection).
    fn clear_local(&self) {
        self.env.channel.disconnect();
        self.env.credentials.clear();
        self.set_state(Session::unauthenticated());
    }

    fn set_state(&self, next: Session) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.status() != next.status() {
            debug!(from = ?state.status(), to = ?next.status(), "session status change");
        }
        *state = next;
    }
}
