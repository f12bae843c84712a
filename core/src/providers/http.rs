//! HTTP transport abstraction: one wire exchange per call.
//!
//! [`ApiRequest`] is the unit the interceptor works with. It carries the
//! opt-out marker (`auth_retry`) that disables the auto-retry path (the
//! logout call and every raw auth exchange set it) and computes the
//! normalized signature the request cache keys on.

use crate::error::Result;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// HTTP method for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// An outbound API request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,

    /// Path relative to the API base URL, e.g. `/dashboard/stats`.
    pub path: String,

    /// Query parameters, appended in the given order.
    pub query: Vec<(String, String)>,

    /// JSON body, if any.
    pub body: Option<Value>,

    /// Opt-out marker: when `false`, the interceptor never auto-retries
    /// this request after an authentication failure.
    pub auth_retry: bool,

    /// Bearer token attached by the interceptor immediately before send.
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Build a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Build a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Build a request with an explicit method.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth_retry: true,
            bearer: None,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters.
    #[must_use]
    pub fn query_pairs(mut self, pairs: &[(String, String)]) -> Self {
        self.query.extend(pairs.iter().cloned());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Disable the interceptor's auth-retry path for this request.
    #[must_use]
    pub const fn no_auth_retry(mut self) -> Self {
        self.auth_retry = false;
        self
    }

    /// Normalized request signature for cache keying: method, path, and
    /// query parameters sorted by key then value. Bodies are not part of
    /// the signature, since only read requests are cached.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut pairs = self.query.clone();
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{} {}", self.method.as_str(), self.path)
        } else {
            format!("{} {}?{query}", self.method.as_str(), self.path)
        }
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,

    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse the body as JSON; an empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Decode`](crate::SessionError::Decode) when the body
    /// is non-empty and not valid JSON.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| crate::SessionError::Decode(e.to_string()))
    }
}

/// One wire exchange.
///
/// Implementations resolve the URL, attach the bearer header, and return
/// whatever the server answered; classification and retries happen above
/// this trait.
pub trait HttpTransport: Send + Sync {
    /// Send a request and await the raw response.
    ///
    /// # Errors
    ///
    /// [`SessionError::Network`](crate::SessionError::Network) when no
    /// response was produced at all. Non-success statuses are **not**
    /// errors at this layer.
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}
