//! Editor-row and preview-frame height controllers.
//!
//! Both controllers keep a single measurement that only grows within one
//! session and returns to its baseline when the content it measures is
//! replaced. Time is host-driven: callers pass monotonic `now` values and
//! poll `tick`.

use std::time::Duration;

use livepen_core::{EditorHeightConfig, PaneKind, PreviewHeightConfig, SourceDocument, Timer};

use crate::metrics::{EditorMetrics, usable_measure};

/// Why the editor row needs remeasuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightTrigger {
    /// Code in a pane changed.
    Content,
    /// The set of visible panes changed.
    Visibility,
    /// The host asked for a recomputation (mount, reset).
    Explicit,
    /// The window was resized. Never shrinks the current height.
    WindowResize,
}

impl HeightTrigger {
    const fn starts_session(self) -> bool {
        !matches!(self, Self::WindowResize)
    }
}

fn clamp_height(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max.max(min))
}

/// Height of the editor row.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorHeightController {
    config: EditorHeightConfig,
    settle: Timer,
    height: f64,
    fresh_session: bool,
}

impl EditorHeightController {
    #[must_use]
    pub fn new(config: EditorHeightConfig) -> Self {
        Self {
            height: config.min_height,
            config,
            settle: Timer::idle(),
            fresh_session: true,
        }
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub const fn is_settling(&self) -> bool {
        self.settle.is_armed()
    }

    /// Schedule a recomputation after the settle delay.
    ///
    /// Repeated triggers inside the delay collapse into one recomputation.
    pub fn invalidate(&mut self, now: Duration, trigger: HeightTrigger) {
        if trigger.starts_session() {
            self.fresh_session = true;
        }
        self.settle.arm(now, self.config.settle_delay);
    }

    /// Drop any pending recomputation.
    pub fn cancel(&mut self) {
        self.settle.cancel();
    }

    /// Recompute if the settle delay has elapsed. Returns the new height when
    /// it changed.
    pub fn tick(
        &mut self,
        now: Duration,
        doc: &SourceDocument,
        panes: &[PaneKind],
        metrics: &dyn EditorMetrics,
    ) -> Option<f64> {
        if !self.settle.fire(now) {
            return None;
        }
        let needed = self.needed_height(doc, panes, metrics);
        let next = if self.fresh_session {
            needed
        } else {
            self.height.max(needed)
        };
        self.fresh_session = false;
        if next == self.height {
            return None;
        }
        tracing::trace!(from = self.height, to = next, "editor row height changed");
        self.height = next;
        Some(next)
    }

    /// Height needed to show the tallest visible pane, clamped to the
    /// configured range.
    ///
    /// Mounted editors report their own content height; others are estimated
    /// from their line count.
    #[must_use]
    pub fn needed_height(
        &self,
        doc: &SourceDocument,
        panes: &[PaneKind],
        metrics: &dyn EditorMetrics,
    ) -> f64 {
        let tallest = panes
            .iter()
            .map(|pane| {
                usable_measure(metrics.content_height(*pane))
                    .unwrap_or_else(|| self.estimate(doc.line_count(*pane)))
            })
            .fold(0.0, f64::max);
        clamp_height(tallest, self.config.min_height, self.config.max_height)
    }

    fn estimate(&self, lines: usize) -> f64 {
        lines as f64 * self.config.line_height + self.config.padding
    }
}

/// Height of the preview frame.
///
/// The observed height is a running maximum seeded at the minimum height.
/// Inbound `heightChange` reports and post-load re-measurements can only
/// raise it; [`PreviewHeightController::reset`] returns it to the minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewHeightController {
    config: PreviewHeightConfig,
    observed: f64,
    rechecks: Vec<Timer>,
}

impl PreviewHeightController {
    #[must_use]
    pub fn new(config: PreviewHeightConfig) -> Self {
        Self {
            observed: config.min_height,
            config,
            rechecks: Vec::new(),
        }
    }

    /// Running maximum, uncapped.
    #[must_use]
    pub const fn observed(&self) -> f64 {
        self.observed
    }

    /// Height to display: the running maximum, capped.
    #[must_use]
    pub fn displayed(&self) -> f64 {
        clamp_height(self.observed, self.config.min_height, self.config.max_height)
    }

    #[must_use]
    pub const fn min_height(&self) -> f64 {
        self.config.min_height
    }

    /// Offer a candidate height. Returns `true` when it raised the maximum.
    pub fn observe(&mut self, height: f64) -> bool {
        if !height.is_finite() || height <= self.observed {
            return false;
        }
        self.observed = height;
        true
    }

    /// Forget the maximum and pending re-checks.
    pub fn reset(&mut self) {
        self.observed = self.config.min_height;
        self.rechecks.clear();
    }

    /// Change the minimum height. Starts a new session.
    pub fn set_min_height(&mut self, min_height: f64) {
        self.config.min_height = min_height;
        self.reset();
    }

    /// The frame finished loading: take its measured height and schedule the
    /// delayed re-checks.
    pub fn frame_loaded(&mut self, now: Duration, measured: Option<f64>) -> bool {
        self.rechecks = self
            .config
            .recheck_delays
            .iter()
            .map(|delay| {
                let mut timer = Timer::idle();
                timer.arm(now, *delay);
                timer
            })
            .collect();
        measured.is_some_and(|height| self.observe(height))
    }

    /// Whether delayed re-checks are still pending.
    #[must_use]
    pub fn has_pending_rechecks(&self) -> bool {
        !self.rechecks.is_empty()
    }

    /// Run due re-checks. `measure` is called at most once per tick.
    pub fn tick(&mut self, now: Duration, measure: impl FnOnce() -> Option<f64>) -> bool {
        let due = self
            .rechecks
            .iter_mut()
            .fold(false, |due, timer| timer.fire(now) || due);
        self.rechecks.retain(Timer::is_armed);
        if !due {
            return false;
        }
        measure().is_some_and(|height| self.observe(height))
    }
}
