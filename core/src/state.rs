//! Session and identity state types.
//!
//! All types are `Clone` snapshots: consumers read copies, never shared
//! mutable state. The [`Session`] constructors uphold the core invariant
//! that a user snapshot exists exactly when the session is authenticated.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// Role granted to a dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full tenant administration.
    Admin,
    /// Team management within a tenant.
    Manager,
    /// Regular dashboard user.
    Employee,
}

impl Role {
    /// Get the role name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Parse a role from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the role string is not recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Identity snapshot for the signed-in user.
///
/// Replaced wholesale on every successful identity fetch; never partially
/// mutated. Role and identity always come from the canonical identity
/// endpoint, not from login responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Name shown in the dashboard header.
    pub display_name: String,

    /// Email address.
    pub email: String,

    /// Role within the tenant.
    pub role: Role,
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No session check has run yet.
    Idle,
    /// A login or session check is in progress.
    Loading,
    /// A verified identity is present.
    Authenticated,
    /// No valid credential; the user must sign in.
    Unauthenticated,
}

/// The authoritative "who is logged in" view.
///
/// Invariant: `user()` is `Some` exactly when `status()` is
/// [`SessionStatus::Authenticated`]. The constructors are the only way to
/// build a `Session`, so the invariant cannot be violated from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    status: SessionStatus,
    user: Option<User>,
}

impl Session {
    /// Fresh session before any check has run.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            user: None,
        }
    }

    /// Session with a login or re-check in progress.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            user: None,
        }
    }

    /// Authenticated session holding a verified identity snapshot.
    #[must_use]
    pub const fn authenticated(user: User) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
        }
    }

    /// Signed-out session.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Identity snapshot, present only while authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a verified identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notification channel phase
// ═══════════════════════════════════════════════════════════════════════

/// Connection phase of the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPhase {
    /// No connection and no connect attempt in progress.
    Disconnected,
    /// A connect attempt (or scheduled reconnect) is in progress.
    Connecting,
    /// The push connection is live.
    Connected,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(),
            display_name: "Dana Ops".to_string(),
            email: "dana@example.com".to_string(),
            role: Role::Manager,
        }
    }

    #[test]
    fn test_user_id_generation() {
        let id1 = UserId::new();
        let id2 = UserId::new();

        // IDs should be unique
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_invariant() {
        assert!(Session::idle().user().is_none());
        assert!(Session::loading().user().is_none());
        assert!(Session::unauthenticated().user().is_none());

        let session = Session::authenticated(sample_user());
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert!(session.user().is_some());
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::parse("manager"), Ok(Role::Manager));
        assert_eq!(Role::parse("EMPLOYEE"), Ok(Role::Employee));
        assert!(Role::parse("superuser").is_err());
    }

    #[test]
    fn test_user_serde_shape() {
        let user = sample_user();
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("displayName").is_some());
        assert_eq!(json.get("role").and_then(|r| r.as_str()), Some("manager"));
    }
}
