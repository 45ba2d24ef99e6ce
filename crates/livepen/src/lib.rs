#![forbid(unsafe_code)]

//! livepen public facade crate.
//!
//! Re-exports the common types of the internal crates and offers a small
//! prelude. Hosts embedding the widget usually only need:
//!
//! ```ignore
//! use livepen::prelude::*;
//!
//! let (channel, _port) = InProcessChannel::pair();
//! let props = WidgetProps {
//!     html: Some("<div id='t'></div>".into()),
//!     js: Some("document.getElementById('t').textContent = 'ok'".into()),
//!     ..WidgetProps::default()
//! };
//! let widget = PreviewWidget::new(
//!     std::time::Duration::ZERO,
//!     props,
//!     WidgetConfig::default(),
//!     channel,
//!     "preview",
//!     &Unmeasured,
//! );
//! println!("{}", widget.preview().html);
//! ```

// --- Core re-exports -------------------------------------------------------

pub use livepen_core::{
    ChannelError, ConfigError, ConsoleConfig, Envelope, FrameId, HostMessage, ImageMap,
    InProcessChannel, MessageChannel, MinHeightSetting, PaneKind, PaneVisibility,
    PreviewMessage, ProtocolError, ResolvedVisibility, SandboxPort, SourceDocument, Theme,
    Visibility, WidgetConfig, resolve_path, resolve_url,
};

// --- Compose re-exports ----------------------------------------------------

pub use livepen_compose::{
    PreviewComposer, PreviewDocument, console_relay_script, height_observer_script,
};

// --- Layout re-exports -----------------------------------------------------

pub use livepen_layout::{
    DividerAccessibility, DividerId, EditorMetrics, GlobalStyleCommand, LayoutError,
    LayoutState, PanelWidths, ResizeDispatch, ResizeEffect, ResizeKey, SplitLayout, Unmeasured,
    auto_fit,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use livepen_runtime::{
    EditorBinding, LongPressEvent, PreviewWidget, ScopedId, SharedSourceStore, SourceRole,
    WidgetProps, WidgetUpdate,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DividerId, EditorMetrics, FrameId, InProcessChannel, MessageChannel, PaneKind,
        PaneVisibility, PreviewComposer, PreviewDocument, PreviewMessage, SourceDocument,
        SplitLayout, Theme, Unmeasured, Visibility, WidgetConfig,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{PreviewWidget, SharedSourceStore, WidgetProps, WidgetUpdate};

    pub use crate::{compose, core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use livepen_compose as compose;
pub use livepen_core as core;
pub use livepen_layout as layout;
#[cfg(feature = "runtime")]
pub use livepen_runtime as runtime;
