//! Channel-backed mock of the notification transport.
//!
//! Each accepted connect yields a [`MockLink`] the test drives: inject
//! inbound frames (business messages, pongs, close frames), observe what
//! the channel manager sent (heartbeats), sever the pipe to simulate an
//! abrupt peer loss, or make sends fail.

use opsboard_core::providers::{Frame, FrameSink, FrameStream, NotificationTransport};
use opsboard_core::{Result, SessionError};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Outcome of one scripted connect attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// Hand the manager a live (mock) connection.
    Accept,
    /// Fail the handshake.
    Reject(SessionError),
}

/// Test-side handle for one accepted connection.
#[derive(Clone)]
pub struct MockLink {
    inbound: Arc<Mutex<Option<mpsc::UnboundedSender<Result<Frame>>>>>,
    sent: Arc<Mutex<Vec<Frame>>>,
    fail_sends: Arc<AtomicBool>,
}

impl MockLink {
    /// Deliver a text frame to the manager.
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Ok(Frame::Text(text.into())));
    }

    /// Deliver a close frame with the given code.
    pub fn push_close(&self, code: Option<u16>) {
        self.push(Ok(Frame::Close { code }));
    }

    /// Deliver a read error.
    pub fn push_error(&self, error: SessionError) {
        self.push(Err(error));
    }

    /// Drop the inbound pipe without a close frame (abrupt peer loss).
    pub fn sever(&self) {
        self.inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Make every subsequent send on this connection fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Frames the manager sent over this connection, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Frame> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text frames the manager sent, in order.
    #[must_use]
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Text(text) => Some(text),
                Frame::Close { .. } => None,
            })
            .collect()
    }

    fn push(&self, frame: Result<Frame>) {
        if let Some(tx) = self
            .inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let _ = tx.send(frame);
        }
    }
}

#[derive(Default)]
struct TransportState {
    script: Mutex<VecDeque<ConnectOutcome>>,
    links: Mutex<Vec<MockLink>>,
    tokens: Mutex<Vec<Option<String>>>,
}

/// Scripted [`NotificationTransport`].
///
/// Connect attempts succeed unless scripted otherwise; every attempt is
/// recorded together with the token it carried. Clones share state.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<TransportState>,
}

impl MockTransport {
    /// Create a transport that accepts every connect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next connect attempt.
    pub fn push_connect(&self, outcome: ConnectOutcome) {
        self.state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of connect attempts seen (accepted or rejected).
    #[must_use]
    pub fn connects(&self) -> usize {
        self.state
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Tokens carried by each connect attempt, in order.
    #[must_use]
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.state
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle for the `index`-th accepted connection.
    #[must_use]
    pub fn link(&self, index: usize) -> Option<MockLink> {
        self.state
            .links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    /// Handle for the most recently accepted connection.
    #[must_use]
    pub fn last_link(&self) -> Option<MockLink> {
        self.state
            .links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl NotificationTransport for MockTransport {
    fn connect(
        &self,
        token: Option<String>,
    ) -> Pin<
        Box<dyn Future<Output = Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)>> + Send + '_>,
    > {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            state
                .tokens
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(token);

            let outcome = state
                .script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or(ConnectOutcome::Accept);

            match outcome {
                ConnectOutcome::Accept => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    let sent = Arc::new(Mutex::new(Vec::new()));
                    let fail_sends = Arc::new(AtomicBool::new(false));
                    let link = MockLink {
                        inbound: Arc::new(Mutex::new(Some(tx))),
                        sent: Arc::clone(&sent),
                        fail_sends: Arc::clone(&fail_sends),
                    };
                    state
                        .links
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(link);

                    let sink = MockSink { sent, fail_sends };
                    let stream = MockStream { rx };
                    Ok((
                        Box::new(sink) as Box<dyn FrameSink>,
                        Box::new(stream) as Box<dyn FrameStream>,
                    ))
                }
                ConnectOutcome::Reject(error) => Err(error),
            }
        })
    }
}

struct MockSink {
    sent: Arc<Mutex<Vec<Frame>>>,
    fail_sends: Arc<AtomicBool>,
}

impl FrameSink for MockSink {
    fn send(&mut self, frame: Frame) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let sent = Arc::clone(&self.sent);
        let fail = self.fail_sends.load(Ordering::SeqCst);
        Box::pin(async move {
            if fail {
                return Err(SessionError::Network("mock send failure".to_string()));
            }
            sent.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(frame);
            Ok(())
        })
    }
}

struct MockStream {
    rx: mpsc::UnboundedReceiver<Result<Frame>>,
}

impl FrameStream for MockStream {
    fn next(&mut self) -> Pin<Box<dyn Future<Output = Option<Result<Frame>>> + Send + '_>> {
        Box::pin(self.rx.recv())
    }
}
