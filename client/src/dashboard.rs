//! Domain-specific dashboard client: the data-fetch helpers presentation
//! calls.
//!
//! Owns its own [`HttpClient`] (sharing the process-wide refresh
//! coordinator) and a [`RequestCache`]. All helpers return opaque
//! [`serde_json::Value`]; the shapes of domain payloads belong to the
//! server and the presentation layer, not to this crate.

use crate::http::HttpClient;
use opsboard_core::Result;
use opsboard_core::providers::ApiRequest;
use opsboard_runtime::RequestCache;
use serde_json::Value;

/// Dashboard read helpers with TTL caching and request deduplication.
#[derive(Clone)]
pub struct DashboardApi {
    http: HttpClient,
    cache: RequestCache,
}

impl DashboardApi {
    /// Create the dashboard client over its own HTTP client and cache.
    #[must_use]
    pub const fn new(http: HttpClient, cache: RequestCache) -> Self {
        Self { http, cache }
    }

    /// Headline statistics for the dashboard cards.
    ///
    /// # Errors
    ///
    /// Transport or HTTP errors from the underlying (deduplicated) fetch.
    pub async fn stats(&self, params: &[(String, String)]) -> Result<Value> {
        self.cached(ApiRequest::get("/dashboard/stats").query_pairs(params))
            .await
    }

    /// Attendance summary rows.
    ///
    /// # Errors
    ///
    /// Transport or HTTP errors from the underlying (deduplicated) fetch.
    pub async fn attendance(&self, params: &[(String, String)]) -> Result<Value> {
        self.cached(ApiRequest::get("/dashboard/attendance").query_pairs(params))
            .await
    }

    /// Unread notifications, used to seed the channel's unread counter.
    ///
    /// # Errors
    ///
    /// Transport or HTTP errors from the underlying (deduplicated) fetch.
    pub async fn unread_notifications(&self) -> Result<Value> {
        self.cached(ApiRequest::get("/notifications/unread")).await
    }

    /// Drop cached reads, e.g. on sign-out.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn cached(&self, request: ApiRequest) -> Result<Value> {
        let key = request.signature();
        let http = self.http.clone();
        self.cache
            .get_or_fetch(&key, move || async move { http.execute(request).await })
            .await
    }
}
