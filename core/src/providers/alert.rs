//! Best-effort alert cue for incoming notifications.

use crate::error::Result;

/// Plays the new-notification cue.
///
/// Strictly best-effort: the channel manager logs and swallows failures, so
/// a broken audio device can never affect channel state.
pub trait AlertSink: Send + Sync {
    /// Play the cue once.
    ///
    /// # Errors
    ///
    /// Whatever the playback backend reports; callers swallow it.
    fn play(&self) -> Result<()>;
}

/// [`AlertSink`] that only records the cue in the log.
///
/// The default for headless deployments and tests that do not care about
/// the cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlert;

impl AlertSink for TracingAlert {
    fn play(&self) -> Result<()> {
        tracing::debug!("notification alert cue");
        Ok(())
    }
}
