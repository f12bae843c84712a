//! Session event hub.
//!
//! This module replaces the ambient global "session expired" broadcast of
//! classic dashboard clients with an explicit publish/subscribe interface:
//! the hub is constructed once by the application context, publishers hold a
//! clone, and dependents register interest with [`SessionEvents::subscribe`]
//! instead of listening on an implicit bus.
//!
//! Delivery uses a [`tokio::sync::broadcast`] channel: every subscriber sees
//! every event published after it subscribed, in publish order. Slow
//! subscribers may lag and skip events; the session layer only publishes
//! edge-triggered facts, so subscribers resynchronize from the session
//! snapshot rather than replaying history.

use crate::notifications::Notification;
use crate::state::{ChannelPhase, User};
use tokio::sync::broadcast;

/// Default buffered capacity of the event hub.
pub const DEFAULT_CAPACITY: usize = 64;

/// Events published by the session layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A verified identity is present (initial sign-in or re-check).
    SignedIn {
        /// The identity snapshot from the canonical identity endpoint.
        user: User,
    },

    /// The session ended deliberately via logout.
    SignedOut,

    /// The credential is no longer valid and could not be renewed.
    ///
    /// Forces the session machine into `Unauthenticated`; presentation
    /// surfaces this as a forced sign-out.
    SessionExpired,

    /// A push notification arrived on the live channel.
    NotificationReceived {
        /// The decoded notification.
        notification: Notification,
        /// Unread count after this notification.
        unread: u32,
    },

    /// The notification channel changed connection phase.
    ChannelChanged {
        /// The new phase.
        phase: ChannelPhase,
    },
}

/// Publish/subscribe hub for [`SessionEvent`].
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a hub with the given buffered capacity (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Publishing with no subscribers is not an error; the event is simply
    /// dropped.
    pub fn publish(&self, event: SessionEvent) {
        tracing::trace!(?event, "publishing session event");
        if self.tx.send(event).is_err() {
            tracing::trace!("no session event subscribers");
        }
    }

    /// Register interest in session events.
    ///
    /// Only events published after this call are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_events_in_publish_order() {
        let events = SessionEvents::default();
        let mut rx = events.subscribe();

        events.publish(SessionEvent::SignedOut);
        events.publish(SessionEvent::SessionExpired);

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SessionExpired);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let events = SessionEvents::new(8);
        // Must not panic or error.
        events.publish(SessionEvent::SignedOut);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let events = SessionEvents::default();
        events.publish(SessionEvent::SignedOut);

        let mut rx = events.subscribe();
        events.publish(SessionEvent::SessionExpired);

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SessionExpired);
        assert!(rx.try_recv().is_err());
    }
}
