//! Ready-made domain values for tests.

use chrono::Utc;
use opsboard_core::providers::TokenGrant;
use opsboard_core::{Notification, NotificationId, Role, User, UserId};

/// A manager-role user with a derived email.
#[must_use]
pub fn user(name: &str) -> User {
    User {
        id: UserId::new(),
        display_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role: Role::Manager,
    }
}

/// A notification created "now" with an empty body.
#[must_use]
pub fn notification(title: &str) -> Notification {
    Notification {
        id: NotificationId::new(),
        title: title.to_string(),
        body: String::new(),
        created_at: Utc::now(),
    }
}

/// A token grant with a 15-minute lifetime.
#[must_use]
pub fn grant(token: &str) -> TokenGrant {
    TokenGrant {
        access_token: token.to_string(),
        expires_in: Some(900),
    }
}
