#![forbid(unsafe_code)]

//! Split-pane layout and height control for livepen.
//!
//! - [`widths`]: percentage widths, the auto-fit solvers and the shared
//!   [`redistribute_pair`] primitive.
//! - [`resize`]: the [`SplitLayout`] controller driving drag, keyboard and
//!   auto-fit interactions.
//! - [`height`]: editor-row and preview-frame height controllers.
//! - [`metrics`]: the [`EditorMetrics`] seam for hosted editor measurements.

pub mod height;
pub mod metrics;
pub mod resize;
pub mod widths;

pub use height::{EditorHeightController, HeightTrigger, PreviewHeightController};
pub use metrics::{EditorMetrics, Unmeasured};
pub use resize::{
    DividerAccessibility, DividerId, GlobalStyleCommand, LayoutState, ResizeDispatch,
    ResizeEffect, ResizeIgnoredReason, ResizeKey, ResizeState, SplitLayout,
};
pub use widths::{
    LayoutError, PairPixels, PanelWidths, auto_fit, fit_unlocked, redistribute_pair,
};
