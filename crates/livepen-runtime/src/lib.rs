#![forbid(unsafe_code)]

//! Runtime for livepen widgets.
//!
//! [`PreviewWidget`] ties the composer, the split layout, the height
//! controllers and the frame message channel into one controller per widget
//! instance. Instances on the same page can share their source through a
//! [`SharedSourceStore`]; a [`LongPressController`] drives the hold-to-reset
//! control.
//!
//! Everything here is single-threaded and host-clocked: the host passes its
//! monotonic time into each call and polls [`PreviewWidget::tick`].

pub mod long_press;
pub mod store;
pub mod widget;

pub use long_press::{LongPressController, LongPressEvent, LongPressPhase};
pub use store::{ScopedId, SharedSourceStore, StoreEntry, Subscription, WriterId};
pub use widget::{
    EditorBinding, PreviewWidget, SourceField, SourceRole, WidgetProps, WidgetUpdate,
};
