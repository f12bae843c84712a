//! `reqwest`-backed HTTP transport.

use opsboard_core::providers::{ApiRequest, HttpMethod, HttpResponse, HttpTransport};
use opsboard_core::{Result, SessionError};
use std::future::Future;
use std::pin::Pin;

/// One wire exchange over a shared [`reqwest::Client`].
///
/// Resolves the request path against the API base URL, attaches query
/// parameters, bearer header, and JSON body, and returns the raw status and
/// body. Classification and retries happen in the layers above.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for the given API base URL (no trailing slash).
    ///
    /// # Errors
    ///
    /// [`SessionError::Internal`] if the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create a transport over an existing client (shared connection pool).
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    const fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, request.path);

        Box::pin(async move {
            let mut builder = client.request(Self::method(request.method), url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| SessionError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| SessionError::Network(e.to_string()))?;

            Ok(HttpResponse { status, body })
        })
    }
}
