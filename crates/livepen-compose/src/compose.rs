//! Preview document composition.
//!
//! [`PreviewComposer::compose`] turns a [`SourceDocument`] into a standalone
//! HTML document for the sandboxed frame:
//!
//! 1. resolve image references in the markup (and normalize attribute quotes)
//! 2. rewrite in-page anchors
//! 3. inject the stylesheet and script into their matching tags
//! 4. escape closing-script sequences in script bodies
//! 5. rewrite `url()` references in the stylesheet
//! 6. append the script when it was not injected
//! 7. add the console relay and height observer when they are useful
//! 8. wrap everything in the document shell
//!
//! Composition is pure; the result is a disposable snapshot.

use livepen_core::{ConsoleConfig, FrameId, ResolvedVisibility, SourceDocument};

use crate::inject::{
    appended_script, inject_css, inject_js, prepare_markup, rewrite_anchors, rewrite_css_urls,
};
use crate::scripts::{
    Instrumentation, console_relay_script, height_observer_script, instrumentation_tag,
};

/// `<meta name>` carrying the frame identity inside the composed document.
pub const FRAME_META_NAME: &str = "livepen-frame";

/// One composed preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub html: String,
    /// The stylesheet replaced a `<link>` in the markup.
    pub css_injected: bool,
    /// The script replaced a `<script src>` in the markup.
    pub js_injected: bool,
    /// The script was appended after the markup.
    pub js_appended: bool,
    pub console_relay: bool,
    pub height_observer: bool,
}

/// Builds preview documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewComposer {
    console: ConsoleConfig,
}

impl PreviewComposer {
    #[must_use]
    pub const fn new(console: ConsoleConfig) -> Self {
        Self { console }
    }

    #[must_use]
    pub const fn console_config(&self) -> &ConsoleConfig {
        &self.console
    }

    /// Compose the document for `frame`.
    #[must_use]
    pub fn compose(
        &self,
        doc: &SourceDocument,
        visibility: &ResolvedVisibility,
        frame: &FrameId,
    ) -> PreviewDocument {
        let images = doc.images.as_ref();

        let markup = prepare_markup(&doc.html, images, doc.html_path.as_deref());
        let markup = rewrite_anchors(&markup);

        let css = rewrite_css_urls(&doc.css, images, doc.css_path.as_deref());

        let css_injection = inject_css(&markup, doc.css_path.as_deref().unwrap_or(""), &css);
        let css_injected = css_injection.injected;

        let js_injection = inject_js(
            &css_injection.html,
            doc.js_path.as_deref().unwrap_or(""),
            &doc.js,
        );
        let js_injected = js_injection.injected;
        let body_markup = js_injection.html;

        let js_appended = !js_injected && !doc.js.trim().is_empty();
        let console_relay = visibility.console;
        let height_observer = visibility.preview;

        let mut html = String::with_capacity(body_markup.len() + css.len() + doc.js.len() + 4096);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        );
        html.push_str(&format!(
            "<meta name=\"{FRAME_META_NAME}\" content=\"{}\">\n",
            v_htmlescape::escape(&frame.to_string())
        ));
        if !css_injected && !css.trim().is_empty() {
            html.push_str(&format!(
                "<style>\n{}\n</style>\n",
                css.strip_suffix('\n').unwrap_or(css.as_ref())
            ));
        }
        html.push_str("</head>\n<body>\n");
        if console_relay {
            html.push_str(&instrumentation_tag(
                Instrumentation::Console,
                &console_relay_script(&self.console),
            ));
            html.push('\n');
        }
        if height_observer {
            html.push_str(&instrumentation_tag(
                Instrumentation::Height,
                height_observer_script(),
            ));
            html.push('\n');
        }
        html.push_str(&body_markup);
        if !body_markup.ends_with('\n') && !body_markup.is_empty() {
            html.push('\n');
        }
        if js_appended {
            html.push_str(&appended_script(&doc.js));
            html.push('\n');
        }
        html.push_str("</body>\n</html>\n");

        tracing::debug!(
            %frame,
            css_injected,
            js_injected,
            js_appended,
            console_relay,
            height_observer,
            "composed preview document"
        );

        PreviewDocument {
            html,
            css_injected,
            js_injected,
            js_appended,
            console_relay,
            height_observer,
        }
    }
}

#[cfg(test)]
mod tests {
    use livepen_core::{FrameId, ResolvedVisibility, SourceDocument};
    use pretty_assertions::assert_eq;

    use super::PreviewComposer;

    fn markup_only() -> ResolvedVisibility {
        ResolvedVisibility {
            html: true,
            preview: true,
            ..ResolvedVisibility::default()
        }
    }

    #[test]
    fn empty_document_has_bare_shell() {
        let doc = SourceDocument::default();
        let out = PreviewComposer::default().compose(
            &doc,
            &ResolvedVisibility::default(),
            &FrameId::new("p"),
        );
        assert_eq!(
            out.html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <meta name=\"livepen-frame\" content=\"p#0\">\n</head>\n<body>\n</body>\n</html>\n"
        );
        assert!(!out.js_appended);
    }

    #[test]
    fn unmatched_css_goes_to_head() {
        let doc = SourceDocument::new("<p>x</p>", "p{color:blue}", "");
        let out = PreviewComposer::default().compose(&doc, &markup_only(), &FrameId::new("p"));
        assert!(!out.css_injected);
        assert!(out.html.contains("<style>\np{color:blue}\n</style>\n</head>"));
    }

    #[test]
    fn instrumentation_follows_visibility() {
        let doc = SourceDocument::new("<p>x</p>", "", "console.log(1)");
        let hidden = PreviewComposer::default().compose(
            &doc,
            &ResolvedVisibility::default(),
            &FrameId::new("p"),
        );
        assert!(!hidden.console_relay && !hidden.height_observer);
        assert!(!hidden.html.contains("data-livepen-instrumentation"));

        let shown =
            PreviewComposer::default().compose(&doc, &ResolvedVisibility::all(), &FrameId::new("p"));
        let console = shown
            .html
            .find("data-livepen-instrumentation=\"console\"")
            .expect("console relay");
        let height = shown
            .html
            .find("data-livepen-instrumentation=\"height\"")
            .expect("height observer");
        let markup = shown.html.find("<p>x</p>").expect("markup");
        let appended = shown.html.find("<script>\nconsole.log(1)\n</script>").expect("script");
        assert!(console < height && height < markup && markup < appended);
    }

    #[test]
    fn frame_identity_is_escaped() {
        let doc = SourceDocument::default();
        let out = PreviewComposer::default().compose(
            &doc,
            &ResolvedVisibility::default(),
            &FrameId::new("a\"b").next_generation(),
        );
        assert!(out.html.contains("content=\"a&quot;b#1\""));
    }
}
