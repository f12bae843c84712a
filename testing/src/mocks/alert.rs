//! Alert sink mocks.

use opsboard_core::providers::AlertSink;
use opsboard_core::{Result, SessionError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// [`AlertSink`] that counts cue plays.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlert {
    plays: Arc<AtomicUsize>,
}

impl RecordingAlert {
    /// Create a sink with zero recorded plays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cue plays so far.
    #[must_use]
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlertSink for RecordingAlert {
    fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// [`AlertSink`] whose every play fails, for asserting that cue failures
/// are swallowed.
#[derive(Debug, Clone, Default)]
pub struct FailingAlert {
    plays: Arc<AtomicUsize>,
}

impl FailingAlert {
    /// Create a failing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attempted plays.
    #[must_use]
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlertSink for FailingAlert {
    fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Err(SessionError::Internal("audio device unavailable".to_string()))
    }
}
