//! Press-and-hold reset gesture.
//!
//! ```text
//! Idle --press--> Charging --tick (elapsed >= duration)--> Triggered -> Idle
//!                    \--release/leave before duration--> Cancelled -> Idle
//! ```
//!
//! Progress is sampled on a fixed tick interval from host time, like the
//! gesture recognizer's `check_long_press` polling. A trigger fires at most
//! once per press.

use std::time::Duration;

use livepen_core::{LongPressConfig, Timer};

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongPressPhase {
    #[default]
    Idle,
    Charging {
        started: Duration,
    },
}

/// Observable transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongPressEvent {
    Started,
    /// New sampled progress in `[0, 1)`.
    Progress(f64),
    /// The hold completed. The owner runs its reset.
    Triggered,
    /// The hold ended early. Progress is back at 0.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongPressController {
    config: LongPressConfig,
    phase: LongPressPhase,
    progress: f64,
    sample: Timer,
}

impl LongPressController {
    #[must_use]
    pub const fn new(config: LongPressConfig) -> Self {
        Self {
            config,
            phase: LongPressPhase::Idle,
            progress: 0.0,
            sample: Timer::idle(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> LongPressPhase {
        self.phase
    }

    /// Last sampled progress.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self.phase, LongPressPhase::Charging { .. })
    }

    /// Press started. A second press while charging is ignored.
    pub fn press(&mut self, now: Duration) -> Option<LongPressEvent> {
        if self.is_charging() {
            return None;
        }
        self.phase = LongPressPhase::Charging { started: now };
        self.progress = 0.0;
        self.sample.arm(now, self.config.tick_interval);
        Some(LongPressEvent::Started)
    }

    /// Sample progress if a tick is due.
    pub fn tick(&mut self, now: Duration) -> Option<LongPressEvent> {
        let LongPressPhase::Charging { started } = self.phase else {
            return None;
        };
        if !self.sample.fire(now) {
            return None;
        }
        let progress = self.fraction(started, now);
        if progress >= 1.0 {
            return Some(self.trigger());
        }
        self.progress = progress;
        self.sample.arm(now, self.config.tick_interval);
        Some(LongPressEvent::Progress(progress))
    }

    /// Press released.
    ///
    /// A release after the full duration counts as a completed hold even if
    /// no tick sampled it yet.
    pub fn release(&mut self, now: Duration) -> Option<LongPressEvent> {
        let LongPressPhase::Charging { started } = self.phase else {
            return None;
        };
        if self.fraction(started, now) >= 1.0 {
            return Some(self.trigger());
        }
        self.cancel();
        Some(LongPressEvent::Cancelled)
    }

    /// Pointer left the control. Same rules as a release.
    pub fn leave(&mut self, now: Duration) -> Option<LongPressEvent> {
        self.release(now)
    }

    /// Drop any press without reporting, e.g. on unmount.
    pub fn cancel(&mut self) {
        self.phase = LongPressPhase::Idle;
        self.progress = 0.0;
        self.sample.cancel();
    }

    fn trigger(&mut self) -> LongPressEvent {
        self.cancel();
        tracing::debug!("long press completed");
        LongPressEvent::Triggered
    }

    fn fraction(&self, started: Duration, now: Duration) -> f64 {
        if self.config.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(started);
        (elapsed.as_secs_f64() / self.config.duration.as_secs_f64()).min(1.0)
    }
}

impl Default for LongPressController {
    fn default() -> Self {
        Self::new(LongPressConfig::default())
    }
}
