//! Measurements reported by the hosted editors.

use livepen_core::PaneKind;

/// Content measurements of the mounted editors.
///
/// Implementations return `None` when an editor is not mounted yet or its
/// DOM is not shaped as expected; callers then fall back to fixed estimates.
pub trait EditorMetrics {
    /// Rendered content width of one editor, in pixels.
    fn content_width(&self, pane: PaneKind) -> Option<f64>;

    /// Rendered content height of one editor, in pixels.
    fn content_height(&self, pane: PaneKind) -> Option<f64>;
}

/// Metrics source for hosts without mounted editors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unmeasured;

impl EditorMetrics for Unmeasured {
    fn content_width(&self, _pane: PaneKind) -> Option<f64> {
        None
    }

    fn content_height(&self, _pane: PaneKind) -> Option<f64> {
        None
    }
}

pub(crate) fn usable_measure(value: Option<f64>) -> Option<f64> {
    value.filter(|px| px.is_finite() && *px > 0.0)
}
