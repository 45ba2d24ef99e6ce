//! Code injection: merging stylesheet and script sources into markup.
//!
//! Every match is made on the raw path text the host supplied, never on a
//! resolved path. Paths are escaped before they reach a regular expression,
//! so `app(1).js` or `a+b.css` match literally.

use std::borrow::Cow;
use std::sync::OnceLock;

use livepen_core::{ImageMap, UrlAttributeShape, resolve_url};
use regex_lite::{Captures, Regex};

use crate::markup::{StartTag, find_start_tags, rewrite_start_tags};

/// Virtual file a stylesheet is assumed to live at when it has no path.
///
/// `url()` references in such a stylesheet resolve from the virtual root.
pub const ROOT_STYLESHEET: &str = "style.css";

/// Attribute marking an element whose body came from a virtual file.
pub const FROM_FILE_ATTRIBUTE: &str = "data-from-file";

/// Elements whose attributes reference images, and the attributes to map.
const IMAGE_ATTRIBUTES: [(&str, &[&str]); 4] = [
    ("img", &["src", "srcset"]),
    ("source", &["src", "srcset"]),
    ("video", &["poster"]),
    ("image", &["href", "xlink:href"]),
];

fn script_body_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\A\s*</script\s*>").expect("script body close regex"))
}

fn closing_script_sequence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(script)").expect("closing script sequence regex"))
}

fn css_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)"#).expect("css url regex")
    })
}

/// Result of one structural injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection<'a> {
    pub html: Cow<'a, str>,
    /// Whether a matching tag was found and replaced.
    pub injected: bool,
}

impl<'a> Injection<'a> {
    fn unchanged(html: &'a str) -> Self {
        Self {
            html: Cow::Borrowed(html),
            injected: false,
        }
    }

    fn replaced(html: &str, range: std::ops::Range<usize>, replacement: &str) -> Self {
        let mut out = String::with_capacity(html.len() + replacement.len());
        out.push_str(&html[..range.start]);
        out.push_str(replacement);
        out.push_str(&html[range.end..]);
        Self {
            html: Cow::Owned(out),
            injected: true,
        }
    }
}

/// Normalize attribute quoting and map image references.
///
/// References are resolved against `html_path` when known.
#[must_use]
pub fn prepare_markup(html: &str, images: Option<&ImageMap>, html_path: Option<&str>) -> String {
    rewrite_start_tags(html, |tag| {
        tag.normalize_quotes();
        if let Some(images) = images {
            resolve_image_attributes(tag, images, html_path);
        }
    })
}

fn resolve_image_attributes(tag: &mut StartTag<'_>, images: &ImageMap, base: Option<&str>) {
    let Some((_, names)) = IMAGE_ATTRIBUTES.iter().find(|(element, _)| tag.is(element)) else {
        return;
    };
    for name in names.iter() {
        let Some(value) = tag.attribute(name) else {
            continue;
        };
        let resolved = UrlAttributeShape::for_attribute(name)
            .resolve(value, Some(images), base)
            .into_owned();
        if resolved != value {
            tag.set_attribute(name, resolved);
        }
    }
}

/// Rewrite in-page anchors (`href="#id"`) into scripted smooth scrolls.
///
/// The preview is not a navigable page, so a fragment link would reload the
/// frame. A bare `#` is left alone. An existing `onclick` handler runs after
/// the scroll.
#[must_use]
pub fn rewrite_anchors(html: &str) -> String {
    rewrite_start_tags(html, |tag| {
        if !tag.is("a") {
            return;
        }
        let Some(target) = tag.attribute("href").and_then(|href| href.strip_prefix('#')) else {
            return;
        };
        if target.is_empty() {
            return;
        }
        let mut onclick = format!(
            "document.getElementById('{}')?.scrollIntoView({{behavior:'smooth'}});",
            escape_js_single_quoted(target)
        );
        if let Some(existing) = tag.attribute("onclick") {
            onclick.push_str(existing);
        }
        tag.set_attribute("href", "javascript:void(0)");
        tag.set_attribute("onclick", onclick);
    })
}

fn escape_js_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Replace the first `<link rel="stylesheet" href="{css_path}">` with an
/// inline `<style>` holding `css`.
///
/// Attribute order is irrelevant and `rel` may list other tokens.
#[must_use]
pub fn inject_css<'a>(html: &'a str, css_path: &str, css: &str) -> Injection<'a> {
    if css_path.is_empty() {
        return Injection::unchanged(html);
    }
    let found = find_start_tags(html, "link", css_path)
        .into_iter()
        .find(|(_, tag)| tag.attribute("href") == Some(css_path) && is_stylesheet(tag));
    let Some((range, _)) = found else {
        tracing::trace!(css_path, "no stylesheet link to inject into");
        return Injection::unchanged(html);
    };
    let replacement = format!(
        "<style {FROM_FILE_ATTRIBUTE}=\"{}\">\n{}\n</style>",
        v_htmlescape::escape(css_path),
        strip_one_newline(css)
    );
    Injection::replaced(html, range, &replacement)
}

fn is_stylesheet(tag: &StartTag<'_>) -> bool {
    tag.attribute("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Replace `<script src="{js_path}"></script>` with an inline script holding
/// `js`.
///
/// Other attributes on the tag (`type="module"`, `defer`) are kept verbatim.
/// When nothing matches, the markup is returned untouched and the caller
/// appends the script instead.
#[must_use]
pub fn inject_js<'a>(html: &'a str, js_path: &str, js: &str) -> Injection<'a> {
    if js_path.is_empty() {
        return Injection::unchanged(html);
    }
    for (range, tag) in find_start_tags(html, "script", js_path) {
        if tag.attribute("src") != Some(js_path) {
            continue;
        }
        let Some(close) = script_body_close_regex().find(&html[range.end..]) else {
            continue;
        };

        let mut open = format!(
            "<script {FROM_FILE_ATTRIBUTE}=\"{}\"",
            v_htmlescape::escape(js_path)
        );
        for attr in tag.attributes() {
            if !attr.name().eq_ignore_ascii_case("src") {
                open.push(' ');
                open.push_str(attr.raw());
            }
        }
        let replacement = format!(
            "{open}>\n{}\n</script>",
            escape_script_close(strip_one_newline(js))
        );
        return Injection::replaced(html, range.start..range.end + close.end(), &replacement);
    }
    tracing::trace!(js_path, "no script tag to inject into");
    Injection::unchanged(html)
}

/// Escape closing-script sequences so script text cannot end its element.
///
/// `</script` becomes `<\/script`, which is the same string to JavaScript.
#[must_use]
pub fn escape_script_close(code: &str) -> Cow<'_, str> {
    closing_script_sequence_regex().replace_all(code, |caps: &Captures<'_>| {
        format!("<\\/{}", &caps[1])
    })
}

/// Rewrite `url(...)` references in a stylesheet through the image map.
///
/// References resolve against `css_path`, or against [`ROOT_STYLESHEET`]
/// when the stylesheet has no virtual path. The original quoting is kept.
#[must_use]
pub fn rewrite_css_urls<'a>(
    css: &'a str,
    images: Option<&ImageMap>,
    css_path: Option<&str>,
) -> Cow<'a, str> {
    let Some(images) = images else {
        return Cow::Borrowed(css);
    };
    let base = css_path.unwrap_or(ROOT_STYLESHEET);
    css_url_regex().replace_all(css, |caps: &Captures<'_>| {
        let (value, quote) = if let Some(value) = caps.get(1) {
            (value.as_str(), "\"")
        } else if let Some(value) = caps.get(2) {
            (value.as_str(), "'")
        } else {
            (caps.get(3).map_or("", |value| value.as_str()), "")
        };
        if value.is_empty() {
            return caps[0].to_string();
        }
        format!(
            "url({quote}{}{quote})",
            resolve_url(value, Some(images), Some(base))
        )
    })
}

/// Plain trailing script for code that was not injected structurally.
#[must_use]
pub fn appended_script(js: &str) -> String {
    format!("<script>\n{}\n</script>", escape_script_close(strip_one_newline(js)))
}

fn strip_one_newline(code: &str) -> &str {
    code.strip_suffix('\n').unwrap_or(code)
}
