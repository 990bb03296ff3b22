//! Single-shot release timer for keyboard debouncing.
//!
//! After a navigation key is released the viewer keeps reporting recent
//! keyboard activity for a short grace window:
//!
//! ```text
//! Events:  up      up [timeout quiet]
//!           │       │        │
//!           ▼       ▼        ▼
//!  force:  true ─── true ─── false
//! ```
//!
//! Each new release supersedes the pending deadline instead of stacking a
//! second one, so there is never more than one outstanding timer.
//!
//! Times are offsets from the host's clock origin, so the timer works the
//! same with a monotonic native clock and with browser event timestamps.

use std::time::Duration;

/// At most one pending deadline.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTimer {
    deadline: Option<Duration>,
}

impl ReleaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the timer to fire `timeout` after `now`, replacing any
    /// pending deadline. A deadline past the end of the clock never fires.
    pub fn schedule(&mut self, now: Duration, timeout: Duration) {
        if self.deadline.is_some() {
            log::trace!("Release timer rescheduled");
        }
        self.deadline = Some(now.checked_add(timeout).unwrap_or(Duration::MAX));
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire the timer if its deadline has passed.
    ///
    /// Returns `true` exactly once per scheduled deadline.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
