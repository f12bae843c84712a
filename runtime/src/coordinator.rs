//! Token refresh coordinator: single-flight credential renewal.
//!
//! When many concurrent requests discover an expired credential at the same
//! time, each of them asks the coordinator to renew. The coordinator runs
//! **one** renewal exchange and shares its outcome with every waiter, which
//! eliminates renewal storms. The slot clears at settlement, so a later
//! caller starts a fresh exchange.
//!
//! One coordinator instance is shared process-wide: both HTTP clients and
//! the notification channel hold the same `Arc<RefreshCoordinator>`.

use crate::single_flight::SingleFlight;
use opsboard_core::providers::TokenRefresher;
use opsboard_core::{Result, SessionError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-flight wrapper around the credential renewal exchange.
pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    flight: SingleFlight<(), SessionError>,
}

impl RefreshCoordinator {
    /// Create a coordinator over the given renewal exchange.
    #[must_use]
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            refresher,
            flight: SingleFlight::new(),
        }
    }

    /// Renew the credential, joining any renewal already in progress.
    ///
    /// All callers waiting on one renewal observe one consistent outcome.
    /// There is no cancellation: a renewal in flight settles on its own
    /// even if every caller has moved on.
    ///
    /// # Errors
    ///
    /// The shared error of the settled renewal exchange.
    pub async fn refresh(&self) -> Result<()> {
        let refresher = Arc::clone(&self.refresher);
        self.flight
            .run(move || async move {
                debug!("starting credential renewal");
                match refresher.refresh().await {
                    Ok(()) => {
                        debug!("credential renewal succeeded");
                        Ok(())
                    }
                    Err(error) => {
                        warn!(%error, "credential renewal failed");
                        Err(error)
                    }
                }
            })
            .await
    }

    /// Whether a renewal is currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.flight.in_flight()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use opsboard_testing::mocks::MockRefresher;
    use tokio::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_run_one_exchange() {
        let refresher = MockRefresher::new().with_delay(Duration::from_millis(20));
        let coordinator = RefreshCoordinator::new(Arc::new(refresher.clone()));

        let (a, b, c) = tokio::join!(
            coordinator.refresh(),
            coordinator.refresh(),
            coordinator.refresh(),
        );

        assert_eq!(refresher.calls(), 1);
        assert_eq!(a, Ok(()));
        assert_eq!(b, Ok(()));
        assert_eq!(c, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_settles_every_waiter_and_clears_the_slot() {
        let refresher = MockRefresher::new().with_delay(Duration::from_millis(20));
        refresher.push_outcome(Err(SessionError::RefreshFailed {
            reason: "grant revoked".to_string(),
        }));
        let coordinator = RefreshCoordinator::new(Arc::new(refresher.clone()));

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
        assert_eq!(refresher.calls(), 1);
        assert!(a.is_err());
        assert_eq!(a, b);

        // Next call after settlement starts a fresh exchange (which succeeds
        // by default).
        assert_eq!(coordinator.refresh().await, Ok(()));
        assert_eq!(refresher.calls(), 2);
    }
}
