#![forbid(unsafe_code)]

//! Core model for livepen live previews.
//!
//! This crate holds everything the other livepen crates agree on:
//!
//! - [`source`]: the editable [`SourceDocument`], pane kinds and the
//!   tri-state visibility rules.
//! - [`path`]: virtual path arithmetic. Paths are keys, never files.
//! - [`assets`]: image/asset lookups against a virtual path map.
//! - [`protocol`]: the typed messages that cross the sandbox boundary and the
//!   [`MessageChannel`] seam used to carry them.
//! - [`console`]: the value-rendering rules of the in-frame console relay.
//! - [`config`]: widget configuration and prop parsing.
//! - [`timer`]: host-driven one-shot deadlines.

pub mod assets;
pub mod config;
pub mod console;
pub mod path;
pub mod protocol;
pub mod source;
pub mod timer;

pub use assets::{ImageMap, UrlAttributeShape, resolve_srcset, resolve_url};
pub use config::{
    ConfigError, ConsoleConfig, EditorHeightConfig, LayoutConfig, LongPressConfig,
    MinHeightSetting, PreviewHeightConfig, Theme, WidgetConfig,
};
pub use console::ConsoleRelay;
pub use path::{is_absolute_url, resolve_path};
pub use protocol::{
    ChannelError, Envelope, FrameId, HostMessage, InProcessChannel, MessageChannel,
    PreviewMessage, ProtocolError, SandboxPort,
};
pub use source::{PaneKind, PaneVisibility, ResolvedVisibility, SourceDocument, Visibility};
pub use timer::Timer;
