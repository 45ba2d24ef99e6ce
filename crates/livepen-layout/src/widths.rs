//! Percentage widths for the visible editor panels.
//!
//! Widths are stored as percentages of the container so they survive
//! container resizes. Pixel arithmetic happens only inside
//! [`redistribute_pair`] and the auto-fit solvers, against a container width
//! supplied by the host.
//!
//! # Invariants
//!
//! 1. The percentages of the visible panels sum to 100 (within
//!    [`WIDTH_EPSILON`]).
//! 2. While the container is wider than `min_width * panels`, no panel is
//!    narrower than `min_width` after any solver or pair redistribution.

use std::fmt;

use livepen_core::PaneKind;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Total of all visible panel percentages.
pub const PERCENT_TOTAL: f64 = 100.0;

/// Tolerance used when comparing width sums.
pub const WIDTH_EPSILON: f64 = 1e-6;

/// Errors from width bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutError {
    UnknownPanel { panel: PaneKind },
    NotAdjacent { left: PaneKind, right: PaneKind },
    ContainerUnknown,
    InvalidPercent { panel: PaneKind, value: f64 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanel { panel } => write!(f, "panel {} is not visible", panel.label()),
            Self::NotAdjacent { left, right } => write!(
                f,
                "panels {} and {} are not adjacent",
                left.label(),
                right.label()
            ),
            Self::ContainerUnknown => write!(f, "container width is unknown"),
            Self::InvalidPercent { panel, value } => {
                write!(f, "invalid width {value} for panel {}", panel.label())
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Usable container width, if the host reported one.
#[must_use]
pub fn usable_container(container_px: Option<f64>) -> Option<f64> {
    container_px.filter(|px| px.is_finite() && *px > 0.0)
}

/// Pixel widths of two adjacent panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairPixels {
    pub left: f64,
    pub right: f64,
}

impl PairPixels {
    #[must_use]
    pub fn total(self) -> f64 {
        self.left + self.right
    }
}

/// Move `delta_px` from the right panel to the left one.
///
/// Only the pair changes, and its combined width is preserved. Neither side
/// goes below `min(min_width, total / 2)`. Dragging, arrow keys and any other
/// manual resize all go through this function.
#[must_use]
pub fn redistribute_pair(start: PairPixels, delta_px: f64, min_width: f64) -> PairPixels {
    let total = start.total();
    if !total.is_finite() || total <= 0.0 {
        return start;
    }
    let floor = min_width.max(0.0).min(total / 2.0);
    let delta = if delta_px.is_finite() { delta_px } else { 0.0 };
    let left = (start.left + delta).clamp(floor, total - floor);
    PairPixels {
        left,
        right: total - left,
    }
}

/// Visible panel widths in display order, as percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelWidths {
    entries: Vec<(PaneKind, f64)>,
}

impl PanelWidths {
    /// Equal shares for every panel.
    #[must_use]
    pub fn equal(panels: &[PaneKind]) -> Self {
        if panels.is_empty() {
            return Self::default();
        }
        let share = PERCENT_TOTAL / panels.len() as f64;
        Self {
            entries: panels.iter().map(|panel| (*panel, share)).collect(),
        }
    }

    /// Build from explicit percentages, rescaled to sum to 100.
    pub fn from_percentages(entries: Vec<(PaneKind, f64)>) -> Result<Self, LayoutError> {
        if let Some((panel, value)) = entries
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(LayoutError::InvalidPercent {
                panel: *panel,
                value: *value,
            });
        }
        let total: f64 = entries.iter().map(|(_, value)| value).sum();
        if total <= 0.0 {
            let panels: Vec<_> = entries.iter().map(|(panel, _)| *panel).collect();
            return Ok(Self::equal(&panels));
        }
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|(panel, value)| (panel, value / total * PERCENT_TOTAL))
                .collect(),
        })
    }

    #[must_use]
    pub fn get(&self, panel: PaneKind) -> Option<f64> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == panel)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaneKind, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn panels(&self) -> impl Iterator<Item = PaneKind> + '_ {
        self.entries.iter().map(|(panel, _)| *panel)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, value)| value).sum()
    }

    /// Pixel width of one panel in a container.
    #[must_use]
    pub fn pixels(&self, panel: PaneKind, container_px: f64) -> Option<f64> {
        self.get(panel)
            .map(|percent| percent / PERCENT_TOTAL * container_px)
    }

    /// Pixel widths of two adjacent panels.
    pub fn pair_pixels(
        &self,
        left: PaneKind,
        right: PaneKind,
        container_px: f64,
    ) -> Result<PairPixels, LayoutError> {
        let (left_index, right_index) = self.adjacent(left, right)?;
        Ok(PairPixels {
            left: self.entries[left_index].1 / PERCENT_TOTAL * container_px,
            right: self.entries[right_index].1 / PERCENT_TOTAL * container_px,
        })
    }

    /// Commit new pixel widths for two adjacent panels.
    pub fn set_pair(
        &mut self,
        left: PaneKind,
        right: PaneKind,
        pair: PairPixels,
        container_px: f64,
    ) -> Result<(), LayoutError> {
        let container = usable_container(Some(container_px)).ok_or(LayoutError::ContainerUnknown)?;
        let (left_index, right_index) = self.adjacent(left, right)?;
        self.entries[left_index].1 = pair.left / container * PERCENT_TOTAL;
        self.entries[right_index].1 = pair.right / container * PERCENT_TOTAL;
        Ok(())
    }

    fn index_of(&self, panel: PaneKind) -> Result<usize, LayoutError> {
        self.entries
            .iter()
            .position(|(candidate, _)| *candidate == panel)
            .ok_or(LayoutError::UnknownPanel { panel })
    }

    fn adjacent(&self, left: PaneKind, right: PaneKind) -> Result<(usize, usize), LayoutError> {
        let left_index = self.index_of(left)?;
        let right_index = self.index_of(right)?;
        if left_index + 1 != right_index {
            return Err(LayoutError::NotAdjacent { left, right });
        }
        Ok((left_index, right_index))
    }
}

fn floored(width: f64, min_width: f64) -> f64 {
    if width.is_finite() {
        width.max(min_width)
    } else {
        min_width
    }
}

/// Proportional widths from desired content widths.
///
/// Desired widths are floored at `min_width`. When they fit the container
/// each panel gets its proportional share. When they overflow, `min_width` is
/// reserved per panel and the rest is shared in proportion to desired width.
/// An unknown container, or one too narrow for the reserve, yields equal
/// shares.
#[must_use]
pub fn auto_fit(
    desired: &[(PaneKind, f64)],
    container_px: Option<f64>,
    min_width: f64,
) -> PanelWidths {
    let panels: Vec<PaneKind> = desired.iter().map(|(panel, _)| *panel).collect();
    let Some(container) = usable_container(container_px) else {
        return PanelWidths::equal(&panels);
    };
    let min_width = min_width.max(0.0);
    let widths: Vec<f64> = desired
        .iter()
        .map(|(_, width)| floored(*width, min_width))
        .collect();
    let sum: f64 = widths.iter().sum();
    if sum <= 0.0 {
        return PanelWidths::equal(&panels);
    }

    if sum <= container {
        return PanelWidths {
            entries: panels
                .into_iter()
                .zip(&widths)
                .map(|(panel, width)| (panel, width / sum * PERCENT_TOTAL))
                .collect(),
        };
    }

    let reserve = min_width * panels.len() as f64;
    if reserve >= container {
        return PanelWidths::equal(&panels);
    }
    let remaining = container - reserve;
    PanelWidths {
        entries: panels
            .into_iter()
            .zip(&widths)
            .map(|(panel, width)| {
                let px = min_width + width / sum * remaining;
                (panel, px / container * PERCENT_TOTAL)
            })
            .collect(),
    }
}

/// Auto-fit that keeps user-resized panels where they are.
///
/// Locked panels keep their current percentage and the others are fitted into
/// the space left over. When the leftover cannot hold the unlocked panels at
/// `min_width` (or the container is unknown) this falls back to a full
/// [`auto_fit`] ignoring the locks.
#[must_use]
pub fn fit_unlocked(
    current: &PanelWidths,
    desired: &[(PaneKind, f64)],
    locked: &FxHashSet<PaneKind>,
    container_px: Option<f64>,
    min_width: f64,
) -> PanelWidths {
    let kept: Vec<(PaneKind, f64)> = desired
        .iter()
        .filter(|(panel, _)| locked.contains(panel))
        .filter_map(|(panel, _)| current.get(*panel).map(|percent| (*panel, percent)))
        .collect();
    if kept.is_empty() {
        return auto_fit(desired, container_px, min_width);
    }
    let Some(container) = usable_container(container_px) else {
        return auto_fit(desired, container_px, min_width);
    };

    let free: Vec<(PaneKind, f64)> = desired
        .iter()
        .filter(|(panel, _)| !kept.iter().any(|(kept_panel, _)| kept_panel == panel))
        .copied()
        .collect();
    let kept_total: f64 = kept.iter().map(|(_, percent)| percent).sum();

    if free.is_empty() {
        return PanelWidths::from_percentages(kept)
            .unwrap_or_else(|_| auto_fit(desired, container_px, min_width));
    }

    let remaining_percent = PERCENT_TOTAL - kept_total;
    let remaining_px = remaining_percent / PERCENT_TOTAL * container;
    let kept_too_narrow = kept
        .iter()
        .any(|(_, percent)| percent / PERCENT_TOTAL * container < min_width - WIDTH_EPSILON);
    if remaining_percent <= 0.0 || remaining_px < min_width * free.len() as f64 || kept_too_narrow
    {
        tracing::debug!(
            kept = kept.len(),
            free = free.len(),
            remaining_px,
            "resized panels leave too little room, refitting all panels"
        );
        return auto_fit(desired, container_px, min_width);
    }

    let fitted = auto_fit(&free, Some(remaining_px), min_width);
    PanelWidths {
        entries: desired
            .iter()
            .map(|(panel, _)| {
                let percent = kept
                    .iter()
                    .find(|(kept_panel, _)| kept_panel == panel)
                    .map(|(_, percent)| *percent)
                    .or_else(|| {
                        fitted
                            .get(*panel)
                            .map(|share| share / PERCENT_TOTAL * remaining_percent)
                    })
                    .unwrap_or(0.0);
                (*panel, percent)
            })
            .collect(),
    }
}
