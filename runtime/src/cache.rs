//! TTL cache composed with in-flight request coalescing.
//!
//! Two mechanisms keyed identically by request signature:
//!
//! 1. **TTL cache**: synchronous lookup; entries older than their TTL are
//!    treated as absent and evicted lazily on the next read.
//! 2. **In-flight map**: a second caller for a signature already being
//!    fetched attaches to the first caller's pending outcome instead of
//!    issuing a new call.
//!
//! Guarantee: for N concurrent identical requests issued before the first
//! settles, exactly one fetch occurs and all N callers receive the
//! identical resolved value or identical error. The in-flight entry is
//! removed on settlement (success or failure), so a later call performs a
//! fresh fetch, subject to a valid cache hit taking precedence.
//!
//! Timing uses [`tokio::time::Instant`], so tests drive expiry with the
//! paused virtual clock.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use opsboard_core::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{Duration, Instant};
use tracing::trace;

type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

struct CacheEntry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= self.ttl
    }
}

struct CacheInner {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, SharedFetch>>,
}

/// TTL cache + in-flight deduplication for read requests.
///
/// Cheap to clone; all clones share the same entries and in-flight map.
#[derive(Clone)]
pub struct RequestCache {
    inner: Arc<CacheInner>,
}

impl RequestCache {
    /// Create a cache whose entries live for `default_ttl`.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                default_ttl,
                entries: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Synchronous lookup. Entries whose age has reached their TTL are
    /// treated as absent and evicted.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                trace!(key, "evicting expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Drop one entry.
    pub fn invalidate(&self, key: &str) {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drop every entry. In-flight fetches are unaffected and still settle
    /// for their waiters.
    pub fn clear(&self) {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Cached fetch with the cache-level default TTL.
    ///
    /// # Errors
    ///
    /// The shared error of the settled fetch; every coalesced waiter
    /// receives the identical failure.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.get_or_fetch_with_ttl(key, self.inner.default_ttl, fetch)
            .await
    }

    /// Cached fetch with an explicit TTL for the resulting entry.
    ///
    /// Order of precedence: a valid cache hit wins; otherwise an in-flight
    /// fetch for the same key is joined; otherwise `fetch()` runs.
    ///
    /// # Errors
    ///
    /// The shared error of the settled fetch.
    pub async fn get_or_fetch_with_ttl<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        if let Some(value) = self.get(key) {
            trace!(key, "cache hit");
            return Ok(value);
        }

        let (outcome, attached) = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = in_flight.get(key) {
                (existing.clone(), true)
            } else {
                let inner = Arc::clone(&self.inner);
                let entry_key = key.to_string();
                let fut = fetch();
                let shared = async move {
                    let outcome = fut.await;
                    // Store the value (if any) before releasing the
                    // in-flight slot, so a caller arriving in between sees
                    // the cache hit rather than starting a duplicate fetch.
                    if let Ok(value) = &outcome {
                        inner
                            .entries
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .insert(
                                entry_key.clone(),
                                CacheEntry {
                                    value: value.clone(),
                                    created_at: Instant::now(),
                                    ttl,
                                },
                            );
                    }
                    inner
                        .in_flight
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&entry_key);
                    outcome
                }
                .boxed()
                .shared();
                in_flight.insert(key.to_string(), shared.clone());
                (shared, false)
            }
        };

        if attached {
            trace!(key, "attached to in-flight fetch");
        }
        outcome.await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use opsboard_core::SessionError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_fetch(
        calls: Arc<AtomicUsize>,
        value: Value,
    ) -> impl Future<Output = Result<Value>> + Send + 'static {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(value)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_ttl() {
        let cache = RequestCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache
            .get_or_fetch("GET /dashboard/stats", {
                let calls = Arc::clone(&calls);
                move || counted_fetch(calls, json!({"total": 1}))
            })
            .await
            .expect("fetch");
        assert_eq!(value, json!({"total": 1}));

        // Age < TTL: present.
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("GET /dashboard/stats"), Some(json!({"total": 1})));

        // Age == TTL: absent and evicted.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("GET /dashboard/stats"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_requests_fetch_once() {
        let cache = RequestCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move || counted_fetch(calls, json!([1, 2, 3]))
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("GET /dashboard/stats?week=12", fetch(&calls)),
            cache.get_or_fetch("GET /dashboard/stats?week=12", fetch(&calls)),
            cache.get_or_fetch("GET /dashboard/stats?week=12", fetch(&calls)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.expect("a"), json!([1, 2, 3]));
        assert_eq!(b.expect("b"), json!([1, 2, 3]));
        assert_eq!(c.expect("c"), json!([1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_key_fetches_fresh_once_expired() {
        // Zero TTL: settlement never produces a usable hit, so dedup alone
        // decides how many fetches run.
        let cache = RequestCache::new(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move || counted_fetch(calls, json!(7))
        };

        // Back-to-back before settlement: one fetch.
        let (a, b) = tokio::join!(
            cache.get_or_fetch("GET /metrics", fetch(&calls)),
            cache.get_or_fetch("GET /metrics", fetch(&calls)),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.expect("a"), json!(7));
        assert_eq!(b.expect("b"), json!(7));

        // Strictly after settlement: a new fetch.
        let c = cache.get_or_fetch("GET /metrics", fetch(&calls)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(c.expect("c"), json!(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_hit_takes_precedence_after_settlement() {
        let cache = RequestCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move || counted_fetch(calls, json!("fresh"))
        };

        cache
            .get_or_fetch("GET /notifications/unread", fetch(&calls))
            .await
            .expect("first");
        let again = cache
            .get_or_fetch("GET /notifications/unread", fetch(&calls))
            .await
            .expect("second");

        assert_eq!(again, json!("fresh"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_shared_and_never_cached() {
        let cache = RequestCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<Value, _>(SessionError::Network("connection reset".to_string()))
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("GET /dashboard/attendance", failing(&calls)),
            cache.get_or_fetch("GET /dashboard/attendance", failing(&calls)),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert!(a.is_err());

        // Failures are not cached: the next call fetches again.
        let calls2 = Arc::new(AtomicUsize::new(0));
        let ok = cache
            .get_or_fetch("GET /dashboard/attendance", {
                let calls2 = Arc::clone(&calls2);
                move || counted_fetch(calls2, json!("recovered"))
            })
            .await;
        assert_eq!(ok.expect("recovered"), json!("recovered"));
        assert_eq!(calls2.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_and_clear() {
        let cache = RequestCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        for key in ["GET /a", "GET /b"] {
            cache
                .get_or_fetch(key, {
                    let calls = Arc::clone(&calls);
                    move || counted_fetch(calls, json!(key))
                })
                .await
                .expect("seed");
        }

        cache.invalidate("GET /a");
        assert_eq!(cache.get("GET /a"), None);
        assert_eq!(cache.get("GET /b"), Some(json!("GET /b")));

        cache.clear();
        assert_eq!(cache.get("GET /b"), None);
    }
}
