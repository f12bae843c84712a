//! The notification channel manager.
//!
//! Owns the single push connection and everything attached to it: the
//! heartbeat, the unread counter, the reconnect policy, and auth-aware
//! recovery. Exactly one connection exists at a time; `connect` while a
//! channel task is active is a no-op.
//!
//! Teardown is synchronous and can never re-enter the reconnect path: the
//! shutdown marker is set **before** the channel task is aborted, and the
//! run loop checks it before every reconnect. Aborting the task drops the
//! heartbeat interval and any pending reconnect timer with it.

use crate::config::ChannelConfig;
use crate::protocol::{self, Inbound};
use opsboard_core::providers::{AlertSink, Frame, FrameSink, FrameStream, NotificationTransport};
use opsboard_core::{ChannelPhase, Notification, SessionEvent, SessionEvents, TokenResolver};
use opsboard_runtime::RefreshCoordinator;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};
use tracing::{debug, info, trace, warn};

/// Connection phase plus retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    /// Current connection phase.
    pub phase: ChannelPhase,

    /// Reconnect attempts since the last successful connection.
    pub retry_count: u32,
}

/// Why a live connection ended.
enum Closure {
    /// Close code inside the reserved auth range.
    Auth(u16),
    /// Any other closure: close frame, read error, or silent peer loss.
    Other(Option<u16>),
}

struct ChannelInner {
    transport: Arc<dyn NotificationTransport>,
    coordinator: Arc<RefreshCoordinator>,
    resolver: Arc<TokenResolver>,
    alert: Arc<dyn AlertSink>,
    events: SessionEvents,
    config: ChannelConfig,
    state: Mutex<ChannelState>,
    unread: AtomicU32,
    shutdown: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelInner {
    fn set_phase(&self, phase: ChannelPhase) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.phase != phase {
            debug!(from = ?state.phase, to = ?phase, "channel phase change");
            state.phase = phase;
            drop(state);
            self.events.publish(SessionEvent::ChannelChanged { phase });
        }
    }

    fn reset_retries(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retry_count = 0;
    }

    /// Record one more reconnect attempt; returns the 0-based attempt index.
    fn bump_retries(&self) -> u32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let attempt = state.retry_count;
        state.retry_count += 1;
        attempt
    }
}

/// Manager for the persistent notification connection.
///
/// Constructed once by the application context; its lifecycle is driven by
/// the session state machine.
pub struct ChannelManager {
    inner: Arc<ChannelInner>,
}

impl ChannelManager {
    /// Create a manager over the given transport and shared services.
    #[must_use]
    pub fn new(
        transport: Arc<dyn NotificationTransport>,
        coordinator: Arc<RefreshCoordinator>,
        resolver: Arc<TokenResolver>,
        alert: Arc<dyn AlertSink>,
        events: SessionEvents,
        config: ChannelConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                transport,
                coordinator,
                resolver,
                alert,
                events,
                config,
                state: Mutex::new(ChannelState {
                    phase: ChannelPhase::Disconnected,
                    retry_count: 0,
                }),
                unread: AtomicU32::new(0),
                shutdown: AtomicBool::new(false),
                task: Mutex::new(None),
            }),
        }
    }

    /// Current channel state snapshot.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current connection phase.
    #[must_use]
    pub fn phase(&self) -> ChannelPhase {
        self.state().phase
    }

    /// Current unread count.
    #[must_use]
    pub fn unread(&self) -> u32 {
        self.inner.unread.load(Ordering::SeqCst)
    }

    /// Seed the unread counter, e.g. from the REST unread fetch.
    pub fn set_unread(&self, unread: u32) {
        self.inner.unread.store(unread, Ordering::SeqCst);
    }

    /// Start the channel task unless one is already active.
    ///
    /// Called by the session machine on every transition into
    /// `Authenticated`; calling it while Connecting or Connected is a
    /// no-op, so exactly one connection exists at a time.
    pub fn connect(&self) {
        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("connect ignored, channel task already active");
            return;
        }

        self.inner.shutdown.store(false, Ordering::SeqCst);
        self.inner.reset_retries();
        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(run_channel(inner)));
    }

    /// Tear the channel down synchronously.
    ///
    /// Sets the shutdown marker first, then aborts the task: the heartbeat
    /// timer and any pending reconnect timer are dropped with it, and the
    /// reconnect path can never run for a deliberate teardown.
    pub fn disconnect(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        self.inner.reset_retries();
        self.inner.set_phase(ChannelPhase::Disconnected);
    }
}

async fn run_channel(inner: Arc<ChannelInner>) {
    loop {
        if inner.shutdown.load(Ordering::SeqCst) {
            break;
        }
        inner.set_phase(ChannelPhase::Connecting);

        let token = inner.resolver.resolve();
        match inner.transport.connect(token).await {
            Ok((sink, stream)) => {
                inner.reset_retries();
                inner.set_phase(ChannelPhase::Connected);
                info!("notification channel connected");

                let closure = drive(&inner, sink, stream).await;
                if inner.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                inner.set_phase(ChannelPhase::Disconnected);

                match closure {
                    Closure::Auth(code) => {
                        warn!(code, "channel closed for authentication, renewing credential");
                        if inner.coordinator.refresh().await.is_ok() {
                            sleep(inner.config.auth_recovery_delay).await;
                        } else {
                            // No blind retry loop against a dead credential:
                            // the session machine restarts the channel on
                            // the next successful sign-in.
                            warn!("renewal failed, channel stays down");
                            break;
                        }
                    }
                    Closure::Other(code) => {
                        let attempt = inner.bump_retries();
                        let delay = inner.config.reconnect.delay_for_attempt(attempt);
                        debug!(?code, attempt, delay_ms = delay.as_millis(), "scheduling reconnect");
                        sleep(delay).await;
                    }
                }
            }
            Err(error) => {
                if inner.shutdown.load(Ordering::SeqCst) {
                    break;
                }
                warn!(%error, "notification connect failed");
                inner.set_phase(ChannelPhase::Disconnected);
                let attempt = inner.bump_retries();
                let delay = inner.config.reconnect.delay_for_attempt(attempt);
                sleep(delay).await;
            }
        }
    }
    inner.set_phase(ChannelPhase::Disconnected);
}

async fn drive(
    inner: &ChannelInner,
    mut sink: Box<dyn FrameSink>,
    mut stream: Box<dyn FrameStream>,
) -> Closure {
    let interval = inner.config.heartbeat_interval;
    let mut heartbeat = interval_at(Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                trace!("heartbeat ping");
                if let Err(error) = sink.send(Frame::Text(protocol::PING.to_string())).await {
                    warn!(%error, "heartbeat send failed");
                    return Closure::Other(None);
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Frame::Text(text))) => handle_text(inner, &text),
                Some(Ok(Frame::Close { code })) => {
                    return match code {
                        Some(code) if inner.config.auth_close_codes.contains(&code) => {
                            Closure::Auth(code)
                        }
                        other => Closure::Other(other),
                    };
                }
                Some(Err(error)) => {
                    warn!(%error, "channel read error");
                    return Closure::Other(None);
                }
                None => {
                    debug!("channel stream ended");
                    return Closure::Other(None);
                }
            }
        }
    }
}

fn handle_text(inner: &ChannelInner, text: &str) {
    match protocol::classify(text) {
        Inbound::Pong => trace!("heartbeat ack"),
        Inbound::Envelope(envelope) if envelope.kind == protocol::NEW_NOTIFICATION => {
            match serde_json::from_value::<Notification>(envelope.data) {
                Ok(notification) => {
                    let unread = inner.unread.fetch_add(1, Ordering::SeqCst) + 1;
                    // Best-effort cue: playback failure never affects the
                    // channel.
                    if let Err(error) = inner.alert.play() {
                        debug!(%error, "alert cue failed");
                    }
                    inner.events.publish(SessionEvent::NotificationReceived {
                        notification,
                        unread,
                    });
                }
                Err(error) => warn!(%error, "discarding malformed notification payload"),
            }
        }
        Inbound::Envelope(envelope) => {
            debug!(kind = %envelope.kind, "ignoring unhandled push message");
        }
        Inbound::Malformed(error) => warn!(%error, "discarding malformed channel frame"),
    }
}
