//! src/model/status.rs
//! ============================================================================
//! # Status Surface
//!
//! The single-slot error message and busy flag the presentation layer
//! renders. Last write wins; a successful operation does not clear a stale
//! message, only a new error or an explicit dismissal replaces it.

use compact_str::CompactString;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct StatusState {
    error: Option<CompactString>,
    busy: bool,
}

impl StatusState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current error message.
    pub fn set_error(&mut self, message: impl Into<CompactString>) {
        let message: CompactString = message.into();
        warn!("Status error: {}", message);
        self.error = Some(message);
    }

    /// Explicit dismissal from the presentation layer.
    pub fn clear_error(&mut self) {
        if self.error.take().is_some() {
            debug!("Status error dismissed");
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }
}
