//! Stubbed HTTP transport.

use opsboard_core::providers::{ApiRequest, HttpResponse, HttpTransport};
use opsboard_core::Result;
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Duration;

#[derive(Default)]
struct HttpScript {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Mutex<Duration>,
}

/// Scripted [`HttpTransport`] recording every request it sees.
///
/// Responses are consumed front-to-back; an empty queue yields
/// `200 {}`. Clones share the script, so one instance can back several
/// clients in a test.
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    script: Arc<HttpScript>,
}

impl MockHttpTransport {
    /// Create a transport answering `200 {}` until scripted otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each exchange in flight for `delay` before answering.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self
            .script
            .delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
        self
    }

    /// Queue a raw response.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(HttpResponse {
                status,
                body: body.into(),
            }));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(status, body.to_string());
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: opsboard_core::SessionError) {
        self.script
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Requests sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<ApiRequest> {
        self.script
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of exchanges performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.script
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl HttpTransport for MockHttpTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        let script = Arc::clone(&self.script);
        Box::pin(async move {
            script
                .requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            let delay = *script
                .delay
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            script
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| {
                    Ok(HttpResponse {
                        status: 200,
                        body: "{}".to_string(),
                    })
                })
        })
    }
}
