//! Single-flight execution: one in-flight operation shared by all callers.
//!
//! Callers that arrive while an execution is in progress attach to the same
//! shared outcome instead of starting a second one; all of them resolve or
//! reject together from one settled result. The in-flight slot is cleared
//! at settlement, before the outcome is handed back, so the next caller
//! always starts a fresh attempt.
//!
//! # Example
//!
//! ```rust
//! use opsboard_runtime::SingleFlight;
//!
//! # async fn example() {
//! let flight: SingleFlight<u32, String> = SingleFlight::new();
//!
//! let (a, b) = tokio::join!(
//!     flight.run(|| async { Ok(42) }),
//!     flight.run(|| async { Ok(7) }), // attaches; its closure never runs
//! );
//! assert_eq!(a, Ok(42));
//! assert_eq!(b, Ok(42));
//! # }
//! ```

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// One in-flight execution shared by all concurrent callers.
///
/// `T` and `E` must be `Clone`: every waiter receives the identical settled
/// value or the identical error.
pub struct SingleFlight<T, E> {
    slot: Arc<Mutex<Option<SharedOutcome<T, E>>>>,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty single-flight slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `make()` unless an execution is already in flight, in which case
    /// attach to it and share its outcome.
    ///
    /// The closure is only invoked by the caller that starts the execution;
    /// attached callers never run theirs.
    ///
    /// # Errors
    ///
    /// The shared error of the settled execution.
    pub async fn run<F, Fut>(&self, make: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (outcome, attached) = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = slot.as_ref() {
                (existing.clone(), true)
            } else {
                let slot_ref = Arc::clone(&self.slot);
                let fut = make();
                let shared = async move {
                    let outcome = fut.await;
                    // Clear the slot at settlement, before any waiter sees
                    // the outcome: the next caller starts a fresh attempt.
                    *slot_ref.lock().unwrap_or_else(PoisonError::into_inner) = None;
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(shared.clone());
                (shared, false)
            }
        };

        if attached {
            tracing::trace!("attached to in-flight execution");
        }
        outcome.await
    }

    /// Whether an execution is currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
