#![forbid(unsafe_code)]

//! Preview composition for livepen.
//!
//! [`PreviewComposer`] merges a [`livepen_core::SourceDocument`] into one
//! standalone document for the sandboxed frame. Matching against user markup
//! is surface-level text matching, isolated in [`markup`] so the rest of the
//! pipeline never builds its own patterns.

pub mod compose;
pub mod inject;
pub mod markup;
pub mod scripts;

pub use compose::{FRAME_META_NAME, PreviewComposer, PreviewDocument};
pub use inject::{
    Injection, ROOT_STYLESHEET, appended_script, escape_script_close, inject_css, inject_js,
    prepare_markup, rewrite_anchors, rewrite_css_urls,
};
pub use scripts::{
    INSTRUMENTATION_ATTRIBUTE, Instrumentation, console_relay_script, height_observer_script,
};
