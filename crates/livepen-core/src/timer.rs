//! Host-driven one-shot deadlines.
//!
//! Nothing in livepen owns a real clock. The host passes its monotonic time
//! into every call, and components poll their [`Timer`]s from `tick`.
//! Cancelling a timer guarantees it never fires for the old deadline.

use std::time::Duration;

/// One-shot deadline against host monotonic time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Duration>,
}

impl Timer {
    /// A disarmed timer.
    #[must_use]
    pub const fn idle() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) to fire `delay` after `now`.
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.deadline = Some(now.saturating_add(delay));
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Fire if due: returns `true` once and disarms.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
