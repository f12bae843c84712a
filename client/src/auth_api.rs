//! REST implementations of the auth endpoints and the renewal exchange.
//!
//! These run over the raw transport with the interceptor opt-out on every
//! request: auth exchanges must never trigger the auto-retry path, and the
//! session machine drives any recovery itself.

use opsboard_core::credentials::keys;
use opsboard_core::providers::{ApiRequest, AuthApi, Credentials, HttpTransport, TokenGrant, TokenRefresher};
use opsboard_core::{
    CredentialStore, Result, SessionError, TokenResolver, User, error::is_auth_status,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// The canonical auth endpoints over REST.
pub struct RestAuthApi {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialStore>,
    resolver: Arc<TokenResolver>,
}

impl RestAuthApi {
    /// Create the auth API over the raw transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self {
            transport,
            credentials,
            resolver,
        }
    }
}

impl AuthApi for RestAuthApi {
    fn login(
        &self,
        credentials: Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<TokenGrant>> + Send + '_>> {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.credentials);
        Box::pin(async move {
            let body = serde_json::to_value(&credentials)
                .map_err(|e| SessionError::Internal(e.to_string()))?;
            let request = ApiRequest::post("/auth/login").json(body).no_auth_retry();

            let response = transport.send(request).await?;
            if !response.is_success() {
                if is_auth_status(response.status) {
                    return Err(SessionError::InvalidCredentials);
                }
                return Err(SessionError::Http {
                    status: response.status,
                    message: response.body,
                });
            }

            let grant: TokenGrant = serde_json::from_str(&response.body)
                .map_err(|e| SessionError::Decode(e.to_string()))?;
            store.set(keys::ACCESS_TOKEN, &grant.access_token);
            debug!("login exchange succeeded");
            Ok(grant)
        })
    }

    fn logout(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let transport = Arc::clone(&self.transport);
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let mut request = ApiRequest::post("/auth/logout").no_auth_retry();
            request.bearer = resolver.resolve();

            let response = transport.send(request).await?;
            if !response.is_success() {
                return Err(SessionError::Http {
                    status: response.status,
                    message: response.body,
                });
            }
            Ok(())
        })
    }

    fn current_identity(&self) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>> {
        let transport = Arc::clone(&self.transport);
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let mut request = ApiRequest::get("/auth/me").no_auth_retry();
            request.bearer = resolver.resolve();

            let response = transport.send(request).await?;
            if !response.is_success() {
                return Err(SessionError::Http {
                    status: response.status,
                    message: response.body,
                });
            }

            serde_json::from_str(&response.body).map_err(|e| SessionError::Decode(e.to_string()))
        })
    }
}

/// The renewal exchange: `POST /auth/refresh` with an empty body.
///
/// A successful exchange persists the new access token; the resolver picks
/// it up on the next outbound request. Single-flighting lives in the
/// coordinator, not here.
pub struct RestRefresher {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialStore>,
    resolver: Arc<TokenResolver>,
}

impl RestRefresher {
    /// Create the renewal exchange over the raw transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self {
            transport,
            credentials,
            resolver,
        }
    }
}

impl TokenRefresher for RestRefresher {
    fn refresh(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.credentials);
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let mut request = ApiRequest::post("/auth/refresh").no_auth_retry();
            request.bearer = resolver.resolve();

            let response = transport.send(request).await?;
            if !response.is_success() {
                return Err(SessionError::RefreshFailed {
                    reason: format!("HTTP {}", response.status),
                });
            }

            let grant: TokenGrant = serde_json::from_str(&response.body)
                .map_err(|e| SessionError::Decode(e.to_string()))?;
            store.set(keys::ACCESS_TOKEN, &grant.access_token);
            debug!("renewal exchange persisted a fresh grant");
            Ok(())
        })
    }
}
