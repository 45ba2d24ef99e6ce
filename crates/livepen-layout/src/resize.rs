//! Split-pane controller: auto-fit, divider drag and keyboard resize.
//!
//! ```text
//! Idle --pointer_down--> Dragging --pointer_up--> Idle
//!   |                        \--force_cancel--> Idle
//!   \--double_activate / Enter / Space--> auto-fit (stays Idle)
//! ```
//!
//! Every manual resize goes through [`redistribute_pair`], so dragging and
//! arrow keys clamp identically. Each entry point returns a
//! [`ResizeDispatch`] describing what happened, including the global style
//! command the host applies to the document while a drag is live.

use livepen_core::{LayoutConfig, PaneKind};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::metrics::{EditorMetrics, usable_measure};
use crate::widths::{
    PERCENT_TOTAL, PairPixels, PanelWidths, auto_fit, fit_unlocked, redistribute_pair,
    usable_container,
};

/// Cursor applied to the whole document during a drag.
pub const RESIZE_CURSOR: &str = "col-resize";
/// `user-select` applied to the whole document during a drag.
pub const RESIZE_USER_SELECT: &str = "none";

/// Divider between two adjacent visible panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DividerId {
    pub left: PaneKind,
    pub right: PaneKind,
}

impl DividerId {
    #[must_use]
    pub const fn new(left: PaneKind, right: PaneKind) -> Self {
        Self { left, right }
    }
}

/// Document-wide style change the host applies around a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalStyleCommand {
    /// Save the current cursor/user-select and apply these.
    Override {
        cursor: &'static str,
        user_select: &'static str,
    },
    /// Put back whatever was saved.
    Restore,
}

/// Keys a focused divider reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKey {
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other,
}

/// Interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeState {
    Idle,
    Dragging {
        divider: DividerId,
        pointer_id: u32,
        origin_x: f64,
        start: PairPixels,
        container_px: f64,
    },
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeIgnoredReason {
    InvalidPosition,
    ActiveDragInProgress,
    NoActiveDrag,
    PointerMismatch,
    UnknownDivider,
    ContainerUnknown,
    UnhandledKey,
}

/// What one input did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeEffect {
    DragStarted { divider: DividerId },
    DragUpdated { divider: DividerId, delta_px: f64 },
    DragCommitted { divider: DividerId },
    DragCanceled { divider: DividerId },
    KeyboardApplied { divider: DividerId, delta_px: f64 },
    AutoFit,
    Ignored(ResizeIgnoredReason),
}

/// Result of one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDispatch {
    pub effect: ResizeEffect,
    pub style_command: Option<GlobalStyleCommand>,
}

impl ResizeDispatch {
    const fn ignored(reason: ResizeIgnoredReason) -> Self {
        Self {
            effect: ResizeEffect::Ignored(reason),
            style_command: None,
        }
    }

    const fn effect(effect: ResizeEffect) -> Self {
        Self {
            effect,
            style_command: None,
        }
    }

    /// Whether the input may have changed the panel widths.
    #[must_use]
    pub const fn widths_changed(&self) -> bool {
        matches!(
            self.effect,
            ResizeEffect::DragUpdated { .. }
                | ResizeEffect::KeyboardApplied { .. }
                | ResizeEffect::AutoFit
        )
    }
}

/// Snapshot of the layout for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub section_widths: PanelWidths,
    pub is_resizing: bool,
}

/// Attributes a divider element exposes to assistive technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividerAccessibility {
    pub role: &'static str,
    pub orientation: &'static str,
    pub label: String,
    pub tab_index: i32,
}

impl DividerAccessibility {
    #[must_use]
    pub fn for_divider(divider: DividerId) -> Self {
        Self {
            role: "separator",
            orientation: "vertical",
            label: format!(
                "Resize {} and {} panes",
                divider.left.label(),
                divider.right.label()
            ),
            tab_index: 0,
        }
    }
}

/// Widths of the visible editor panels and the live resize interaction.
#[derive(Debug, Clone)]
pub struct SplitLayout {
    config: LayoutConfig,
    container_px: Option<f64>,
    widths: PanelWidths,
    user_resized: FxHashSet<PaneKind>,
    state: ResizeState,
}

impl SplitLayout {
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            container_px: None,
            widths: PanelWidths::default(),
            user_resized: FxHashSet::default(),
            state: ResizeState::Idle,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub const fn widths(&self) -> &PanelWidths {
        &self.widths
    }

    #[must_use]
    pub const fn state(&self) -> ResizeState {
        self.state
    }

    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Dragging { .. })
    }

    #[must_use]
    pub fn layout_state(&self) -> LayoutState {
        LayoutState {
            section_widths: self.widths.clone(),
            is_resizing: self.is_resizing(),
        }
    }

    #[must_use]
    pub fn is_user_resized(&self, panel: PaneKind) -> bool {
        self.user_resized.contains(&panel)
    }

    #[must_use]
    pub const fn container_width(&self) -> Option<f64> {
        self.container_px
    }

    /// Record the live container width.
    pub fn set_container_width(&mut self, container_px: Option<f64>) {
        self.container_px = usable_container(container_px);
    }

    /// Dividers between adjacent visible panels, left to right.
    #[must_use]
    pub fn dividers(&self) -> Vec<DividerId> {
        let panels: Vec<PaneKind> = self.widths.panels().collect();
        panels
            .windows(2)
            .map(|pair| DividerId::new(pair[0], pair[1]))
            .collect()
    }

    #[must_use]
    pub fn accessibility(&self, divider: DividerId) -> Option<DividerAccessibility> {
        self.dividers()
            .contains(&divider)
            .then(|| DividerAccessibility::for_divider(divider))
    }

    /// Desired width per panel: the editor's rendered content width when
    /// measurable, floored at the minimum panel width.
    #[must_use]
    pub fn desired_widths(
        &self,
        panels: &[PaneKind],
        metrics: &dyn EditorMetrics,
    ) -> Vec<(PaneKind, f64)> {
        panels
            .iter()
            .map(|panel| {
                let width = usable_measure(metrics.content_width(*panel))
                    .map_or(self.config.min_panel_width, |px| {
                        px.max(self.config.min_panel_width)
                    });
                (*panel, width)
            })
            .collect()
    }

    /// Adopt a new visible panel set. Returns `None` when it is unchanged.
    ///
    /// A live drag is cancelled first. User-resized panels that stay visible
    /// keep their widths.
    pub fn sync_panels(
        &mut self,
        panels: &[PaneKind],
        metrics: &dyn EditorMetrics,
    ) -> Option<ResizeDispatch> {
        if self.widths.panels().eq(panels.iter().copied()) {
            return None;
        }
        let style_command = self.force_cancel().and_then(|dispatch| dispatch.style_command);
        self.user_resized.retain(|panel| panels.contains(panel));
        self.refit_panels(panels, metrics);
        Some(ResizeDispatch {
            effect: ResizeEffect::AutoFit,
            style_command,
        })
    }

    /// Re-run auto-fit, leaving user-resized panels alone.
    pub fn refit(&mut self, metrics: &dyn EditorMetrics) -> ResizeDispatch {
        if self.is_resizing() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ActiveDragInProgress);
        }
        let panels: Vec<PaneKind> = self.widths.panels().collect();
        self.refit_panels(&panels, metrics);
        ResizeDispatch::effect(ResizeEffect::AutoFit)
    }

    /// Explicit auto-fit of every panel; forgets manual resizes.
    pub fn auto_fit_all(&mut self, metrics: &dyn EditorMetrics) -> ResizeDispatch {
        if self.is_resizing() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ActiveDragInProgress);
        }
        self.user_resized.clear();
        let panels: Vec<PaneKind> = self.widths.panels().collect();
        self.refit_panels(&panels, metrics);
        tracing::debug!(panels = panels.len(), "auto-fit all panels");
        ResizeDispatch::effect(ResizeEffect::AutoFit)
    }

    fn refit_panels(&mut self, panels: &[PaneKind], metrics: &dyn EditorMetrics) {
        let desired = self.desired_widths(panels, metrics);
        self.widths = if self.user_resized.is_empty() {
            auto_fit(&desired, self.container_px, self.config.min_panel_width)
        } else {
            fit_unlocked(
                &self.widths,
                &desired,
                &self.user_resized,
                self.container_px,
                self.config.min_panel_width,
            )
        };
    }

    /// Double-click on a divider.
    pub fn double_activate(
        &mut self,
        divider: DividerId,
        metrics: &dyn EditorMetrics,
    ) -> ResizeDispatch {
        if !self.dividers().contains(&divider) {
            return ResizeDispatch::ignored(ResizeIgnoredReason::UnknownDivider);
        }
        self.auto_fit_all(metrics)
    }

    /// Pointer pressed on a divider.
    pub fn pointer_down(&mut self, divider: DividerId, pointer_id: u32, x: f64) -> ResizeDispatch {
        if self.is_resizing() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ActiveDragInProgress);
        }
        if !x.is_finite() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::InvalidPosition);
        }
        let Some(container_px) = self.container_px else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ContainerUnknown);
        };
        let Ok(start) = self
            .widths
            .pair_pixels(divider.left, divider.right, container_px)
        else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::UnknownDivider);
        };

        self.state = ResizeState::Dragging {
            divider,
            pointer_id,
            origin_x: x,
            start,
            container_px,
        };
        tracing::debug!(?divider, pointer_id, "divider drag started");
        ResizeDispatch {
            effect: ResizeEffect::DragStarted { divider },
            style_command: Some(GlobalStyleCommand::Override {
                cursor: RESIZE_CURSOR,
                user_select: RESIZE_USER_SELECT,
            }),
        }
    }

    /// Pointer moved anywhere while a drag may be live.
    pub fn pointer_move(&mut self, pointer_id: u32, x: f64) -> ResizeDispatch {
        let ResizeState::Dragging {
            divider,
            pointer_id: active,
            origin_x,
            start,
            container_px,
        } = self.state
        else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::NoActiveDrag);
        };
        if active != pointer_id {
            return ResizeDispatch::ignored(ResizeIgnoredReason::PointerMismatch);
        }
        if !x.is_finite() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::InvalidPosition);
        }

        let delta_px = x - origin_x;
        let pair = redistribute_pair(start, delta_px, self.config.min_panel_width);
        if self
            .widths
            .set_pair(divider.left, divider.right, pair, container_px)
            .is_err()
        {
            return ResizeDispatch::ignored(ResizeIgnoredReason::UnknownDivider);
        }
        ResizeDispatch::effect(ResizeEffect::DragUpdated { divider, delta_px })
    }

    /// Pointer released anywhere. Commits the drag.
    pub fn pointer_up(&mut self, pointer_id: u32) -> ResizeDispatch {
        let ResizeState::Dragging {
            divider,
            pointer_id: active,
            ..
        } = self.state
        else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::NoActiveDrag);
        };
        if active != pointer_id {
            return ResizeDispatch::ignored(ResizeIgnoredReason::PointerMismatch);
        }
        self.state = ResizeState::Idle;
        self.user_resized.insert(divider.left);
        self.user_resized.insert(divider.right);
        tracing::debug!(?divider, "divider drag committed");
        ResizeDispatch {
            effect: ResizeEffect::DragCommitted { divider },
            style_command: Some(GlobalStyleCommand::Restore),
        }
    }

    /// End a live drag without committing it, e.g. on unmount.
    ///
    /// Widths stay where the drag left them. Returns `None` when idle.
    pub fn force_cancel(&mut self) -> Option<ResizeDispatch> {
        let ResizeState::Dragging { divider, .. } = self.state else {
            return None;
        };
        self.state = ResizeState::Idle;
        tracing::debug!(?divider, "divider drag cancelled");
        Some(ResizeDispatch {
            effect: ResizeEffect::DragCanceled { divider },
            style_command: Some(GlobalStyleCommand::Restore),
        })
    }

    /// Key pressed on a focused divider.
    pub fn key(
        &mut self,
        divider: DividerId,
        key: ResizeKey,
        metrics: &dyn EditorMetrics,
    ) -> ResizeDispatch {
        let direction = match key {
            ResizeKey::ArrowLeft => -1.0,
            ResizeKey::ArrowRight => 1.0,
            ResizeKey::Enter | ResizeKey::Space => return self.double_activate(divider, metrics),
            ResizeKey::Other => {
                return ResizeDispatch::ignored(ResizeIgnoredReason::UnhandledKey);
            }
        };
        if self.is_resizing() {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ActiveDragInProgress);
        }
        let Some(container_px) = self.container_px else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::ContainerUnknown);
        };
        let Ok(start) = self
            .widths
            .pair_pixels(divider.left, divider.right, container_px)
        else {
            return ResizeDispatch::ignored(ResizeIgnoredReason::UnknownDivider);
        };

        let delta_px = direction * self.config.keyboard_step_percent * container_px / PERCENT_TOTAL;
        let pair = redistribute_pair(start, delta_px, self.config.min_panel_width);
        if self
            .widths
            .set_pair(divider.left, divider.right, pair, container_px)
            .is_err()
        {
            return ResizeDispatch::ignored(ResizeIgnoredReason::UnknownDivider);
        }
        self.user_resized.insert(divider.left);
        self.user_resized.insert(divider.right);
        ResizeDispatch::effect(ResizeEffect::KeyboardApplied { divider, delta_px })
    }
}
