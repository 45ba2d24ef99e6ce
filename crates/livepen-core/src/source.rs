//! The editable source model.

use serde::{Deserialize, Serialize};

use crate::assets::ImageMap;

/// One of the three editable code panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneKind {
    Html,
    Css,
    Js,
}

impl PaneKind {
    /// Panes in display order.
    pub const ALL: [Self; 3] = [Self::Html, Self::Css, Self::Js];

    /// Human-readable label used in accessibility text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Js => "JS",
        }
    }

    /// Language identifier handed to the hosted editor.
    #[must_use]
    pub const fn language_id(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "javascript",
        }
    }
}

/// One logical editable unit: three code fragments, their virtual paths and
/// an optional image map.
///
/// Deserialized documents go through [`normalize_code`] like constructed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentFields")]
pub struct SourceDocument {
    pub html: String,
    pub css: String,
    pub js: String,
    pub html_path: Option<String>,
    pub css_path: Option<String>,
    pub js_path: Option<String>,
    pub images: Option<ImageMap>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DocumentFields {
    html: String,
    css: String,
    js: String,
    html_path: Option<String>,
    css_path: Option<String>,
    js_path: Option<String>,
    images: Option<ImageMap>,
}

impl From<DocumentFields> for SourceDocument {
    fn from(fields: DocumentFields) -> Self {
        Self {
            html: normalize_code(&fields.html),
            css: normalize_code(&fields.css),
            js: normalize_code(&fields.js),
            html_path: fields.html_path,
            css_path: fields.css_path,
            js_path: fields.js_path,
            images: fields.images,
        }
    }
}

impl SourceDocument {
    /// Build a document from raw code, normalizing line terminators.
    #[must_use]
    pub fn new(html: &str, css: &str, js: &str) -> Self {
        Self {
            html: normalize_code(html),
            css: normalize_code(css),
            js: normalize_code(js),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn code(&self, pane: PaneKind) -> &str {
        match pane {
            PaneKind::Html => &self.html,
            PaneKind::Css => &self.css,
            PaneKind::Js => &self.js,
        }
    }

    /// Replace one code field. The stored text is normalized with
    /// [`normalize_code`]. Returns `true` when the stored value changed.
    pub fn set_code(&mut self, pane: PaneKind, text: &str) -> bool {
        let normalized = normalize_code(text);
        let slot = match pane {
            PaneKind::Html => &mut self.html,
            PaneKind::Css => &mut self.css,
            PaneKind::Js => &mut self.js,
        };
        if *slot == normalized {
            return false;
        }
        *slot = normalized;
        true
    }

    #[must_use]
    pub fn path(&self, pane: PaneKind) -> Option<&str> {
        match pane {
            PaneKind::Html => self.html_path.as_deref(),
            PaneKind::Css => self.css_path.as_deref(),
            PaneKind::Js => self.js_path.as_deref(),
        }
    }

    /// Number of lines in one pane, counting an empty pane as one line.
    #[must_use]
    pub fn line_count(&self, pane: PaneKind) -> usize {
        self.code(pane).lines().count().max(1)
    }
}

/// Normalize code so that non-empty text ends with exactly one `\n`.
///
/// Empty text (or text made only of line terminators) becomes empty.
#[must_use]
pub fn normalize_code(text: &str) -> String {
    let trimmed = text.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        String::new()
    } else {
        let mut out = String::with_capacity(trimmed.len() + 1);
        out.push_str(trimmed);
        out.push('\n');
        out
    }
}

/// Tri-state visibility override for one pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Inferred from content presence.
    #[default]
    Auto,
    Shown,
    Hidden,
}

impl Visibility {
    #[must_use]
    pub const fn resolve(self, has_content: bool) -> bool {
        match self {
            Self::Auto => has_content,
            Self::Shown => true,
            Self::Hidden => false,
        }
    }
}

impl From<Option<bool>> for Visibility {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::Auto,
            Some(true) => Self::Shown,
            Some(false) => Self::Hidden,
        }
    }
}

/// Visibility overrides for every pane of a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneVisibility {
    pub html: Visibility,
    pub css: Visibility,
    pub js: Visibility,
    pub preview: Visibility,
    pub console: Visibility,
}

impl PaneVisibility {
    /// Resolve every override against the current document.
    ///
    /// In `Auto` mode an editor pane is shown when its code is non-empty, the
    /// preview is shown when any code is non-empty and the console is shown
    /// when there is script to run.
    #[must_use]
    pub fn resolve(&self, doc: &SourceDocument) -> ResolvedVisibility {
        let has_html = !doc.html.is_empty();
        let has_css = !doc.css.is_empty();
        let has_js = !doc.js.is_empty();
        ResolvedVisibility {
            html: self.html.resolve(has_html),
            css: self.css.resolve(has_css),
            js: self.js.resolve(has_js),
            preview: self.preview.resolve(has_html || has_css || has_js),
            console: self.console.resolve(has_js),
        }
    }
}

/// Concrete visibility flags after resolving overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVisibility {
    pub html: bool,
    pub css: bool,
    pub js: bool,
    pub preview: bool,
    pub console: bool,
}

impl ResolvedVisibility {
    /// Everything visible.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            html: true,
            css: true,
            js: true,
            preview: true,
            console: true,
        }
    }

    #[must_use]
    pub const fn pane(&self, pane: PaneKind) -> bool {
        match pane {
            PaneKind::Html => self.html,
            PaneKind::Css => self.css,
            PaneKind::Js => self.js,
        }
    }

    /// Visible editor panes in display order.
    #[must_use]
    pub fn visible_panes(&self) -> Vec<PaneKind> {
        PaneKind::ALL
            .into_iter()
            .filter(|pane| self.pane(*pane))
            .collect()
    }

    /// Whether any editor pane is visible.
    #[must_use]
    pub const fn any_editor(&self) -> bool {
        self.html || self.css || self.js
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{PaneKind, PaneVisibility, SourceDocument, Visibility, normalize_code};

    #[test]
    fn deserialized_documents_are_normalized() {
        let doc: SourceDocument =
            serde_json::from_str(r#"{"html":"<p>x</p>","css":"\n\n","js":"run()\r\n\n","jsPath":"a.js"}"#)
                .expect("json");
        assert_eq!(doc.html, "<p>x</p>\n");
        assert_eq!(doc.css, "");
        assert_eq!(doc.js, "run()\n");
        assert_eq!(doc.js_path.as_deref(), Some("a.js"));
        assert_eq!(doc.images, None);

        let round_trip: SourceDocument =
            serde_json::from_str(&serde_json::to_string(&doc).expect("serialize")).expect("json");
        assert_eq!(round_trip, doc);
    }

    #[test]
    fn normalize_appends_single_newline() {
        assert_eq!(normalize_code("a"), "a\n");
        assert_eq!(normalize_code("a\n"), "a\n");
        assert_eq!(normalize_code("a\n\n\r\n"), "a\n");
        assert_eq!(normalize_code("a\nb"), "a\nb\n");
    }

    #[test]
    fn normalize_keeps_empty_empty() {
        assert_eq!(normalize_code(""), "");
        assert_eq!(normalize_code("\n\n"), "");
    }

    #[test]
    fn set_code_reports_changes() {
        let mut doc = SourceDocument::new("<p>hi</p>", "", "");
        assert!(!doc.set_code(PaneKind::Html, "<p>hi</p>\n"));
        assert!(doc.set_code(PaneKind::Css, "p{}"));
        assert_eq!(doc.code(PaneKind::Css), "p{}\n");
    }

    #[test]
    fn line_count_never_zero() {
        let doc = SourceDocument::new("a\nb\nc", "", "");
        assert_eq!(doc.line_count(PaneKind::Html), 3);
        assert_eq!(doc.line_count(PaneKind::Js), 1);
    }

    #[test]
    fn auto_visibility_follows_content() {
        let doc = SourceDocument::new("<div></div>", "", "");
        let resolved = PaneVisibility::default().resolve(&doc);
        assert!(resolved.html);
        assert!(!resolved.css);
        assert!(!resolved.js);
        assert!(resolved.preview);
        assert!(!resolved.console);
        assert_eq!(resolved.visible_panes(), vec![PaneKind::Html]);
    }

    #[test]
    fn explicit_overrides_win() {
        let doc = SourceDocument::new("", "", "");
        let visibility = PaneVisibility {
            css: Visibility::Shown,
            console: Visibility::from(Some(true)),
            preview: Visibility::from(Some(false)),
            ..PaneVisibility::default()
        };
        let resolved = visibility.resolve(&doc);
        assert_eq!(resolved.visible_panes(), vec![PaneKind::Css]);
        assert!(resolved.console);
        assert!(!resolved.preview);
    }

    #[test]
    fn visibility_serde_uses_lowercase_names() {
        let parsed: PaneVisibility =
            serde_json::from_str(r#"{"html":"hidden","js":"shown"}"#).expect("json");
        assert_eq!(parsed.html, Visibility::Hidden);
        assert_eq!(parsed.js, Visibility::Shown);
        assert_eq!(parsed.css, Visibility::Auto);
    }
}
