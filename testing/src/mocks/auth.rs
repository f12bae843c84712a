//! Mock auth API and token refresher.

use crate::fixtures;
use opsboard_core::providers::{AuthApi, Credentials, TokenGrant, TokenRefresher};
use opsboard_core::{Result, User};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Duration;

#[derive(Default)]
struct AuthScript {
    logins: Mutex<VecDeque<Result<TokenGrant>>>,
    logouts: Mutex<VecDeque<Result<()>>>,
    identities: Mutex<VecDeque<Result<User>>>,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    identity_calls: AtomicUsize,
    seen_credentials: Mutex<Vec<Credentials>>,
}

/// Scripted [`AuthApi`].
///
/// Outcomes are consumed front-to-back; an empty queue yields a default
/// success (fixture grant / fixture user). Clones share the script.
#[derive(Clone, Default)]
pub struct MockAuthApi {
    script: Arc<AuthScript>,
}

impl MockAuthApi {
    /// Create a mock that succeeds with fixture values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next login outcome.
    pub fn push_login(&self, outcome: Result<TokenGrant>) {
        self.script
            .logins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Queue the next logout outcome.
    pub fn push_logout(&self, outcome: Result<()>) {
        self.script
            .logouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Queue the next identity-fetch outcome.
    pub fn push_identity(&self, outcome: Result<User>) {
        self.script
            .identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of login exchanges performed.
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.script.login_calls.load(Ordering::SeqCst)
    }

    /// Number of logout exchanges performed.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.script.logout_calls.load(Ordering::SeqCst)
    }

    /// Number of identity fetches performed.
    #[must_use]
    pub fn identity_calls(&self) -> usize {
        self.script.identity_calls.load(Ordering::SeqCst)
    }

    /// Credentials seen by `login`, in call order.
    #[must_use]
    pub fn seen_credentials(&self) -> Vec<Credentials> {
        self.script
            .seen_credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthApi for MockAuthApi {
    fn login(
        &self,
        credentials: Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<TokenGrant>> + Send + '_>> {
        let script = Arc::clone(&self.script);
        Box::pin(async move {
            script.login_calls.fetch_add(1, Ordering::SeqCst);
            script
                .seen_credentials
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(credentials);
            script
                .logins
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(fixtures::grant("mock-token")))
        })
    }

    fn logout(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let script = Arc::clone(&self.script);
        Box::pin(async move {
            script.logout_calls.fetch_add(1, Ordering::SeqCst);
            script
                .logouts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or(Ok(()))
        })
    }

    fn current_identity(&self) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>> {
        let script = Arc::clone(&self.script);
        Box::pin(async move {
            script.identity_calls.fetch_add(1, Ordering::SeqCst);
            script
                .identities
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(fixtures::user("Mock User")))
        })
    }
}

#[derive(Default)]
struct RefresherScript {
    outcomes: Mutex<VecDeque<Result<()>>>,
    calls: AtomicUsize,
    delay: Mutex<Duration>,
}

/// Scripted [`TokenRefresher`] with an optional in-flight delay.
///
/// The delay keeps a renewal pending long enough for concurrent callers to
/// attach; tests run it under the paused tokio clock.
#[derive(Clone, Default)]
pub struct MockRefresher {
    script: Arc<RefresherScript>,
}

impl MockRefresher {
    /// Create a refresher that succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each renewal in flight for `delay` before settling.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self
            .script
            .delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
        self
    }

    /// Queue the next renewal outcome.
    pub fn push_outcome(&self, outcome: Result<()>) {
        self.script
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of renewal exchanges performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }
}

impl TokenRefresher for MockRefresher {
    fn refresh(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let script = Arc::clone(&self.script);
        Box::pin(async move {
            script.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *script
                .delay
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            script
                .outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or(Ok(()))
        })
    }
}
