//! Auth endpoint and credential renewal traits.

use crate::error::Result;
use crate::state::User;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Login input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create login credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Result of a login or renewal exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    /// Bearer token for subsequent requests.
    pub access_token: String,

    /// Token lifetime in seconds, when the server reports one.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// The canonical auth endpoints.
///
/// Identity always comes from `current_identity`; login responses are never
/// trusted for role or identity. Implementations persist the granted token
/// into the credential store themselves; callers only clear hints.
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token grant.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidCredentials`](crate::SessionError::InvalidCredentials)
    /// when the server rejects the login; transport errors otherwise.
    fn login(
        &self,
        credentials: Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<TokenGrant>> + Send + '_>>;

    /// Best-effort server-side session invalidation.
    ///
    /// Must never trigger the interceptor's auth-retry path.
    ///
    /// # Errors
    ///
    /// Transport or HTTP errors; callers are expected to swallow them.
    fn logout(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Fetch the current identity from the canonical source.
    ///
    /// # Errors
    ///
    /// An auth-class error when the credential is missing or stale;
    /// transport errors otherwise.
    fn current_identity(&self) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>>;
}

/// One credential renewal exchange.
///
/// Implementations perform exactly one network exchange per call and persist
/// the new grant; single-flighting lives in the refresh coordinator, never
/// here.
pub trait TokenRefresher: Send + Sync {
    /// Renew the credential.
    ///
    /// # Errors
    ///
    /// [`SessionError::RefreshFailed`](crate::SessionError::RefreshFailed)
    /// when the server declines the renewal; transport errors otherwise.
    fn refresh(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_grant_decodes_with_and_without_expiry() {
        let with: TokenGrant =
            serde_json::from_str(r#"{"accessToken":"tok-1","expiresIn":900}"#).expect("decode");
        assert_eq!(with.access_token, "tok-1");
        assert_eq!(with.expires_in, Some(900));

        let without: TokenGrant =
            serde_json::from_str(r#"{"accessToken":"tok-2"}"#).expect("decode");
        assert_eq!(without.expires_in, None);
    }
}
