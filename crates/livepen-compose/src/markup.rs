//! Surface-level markup matching.
//!
//! User markup is arbitrary and often malformed, so nothing here builds a DOM.
//! Instead this module offers a small set of pattern primitives that every
//! transformation goes through:
//!
//! - [`split_raw_text`] separates markup from `<script>`/`<style>` bodies so
//!   rewrites never touch code.
//! - [`StartTag`] parses one start tag into attributes and re-renders only
//!   the attributes that were edited.
//! - [`rewrite_start_tags`] applies an edit to every start tag in markup.
//! - [`find_start_tags`] locates tags by a literal attribute value, escaping
//!   the value before it enters a regular expression.
//!
//! Values set through [`StartTag::set_attribute`] are plain text and are
//! HTML-escaped on render. Values re-quoted by [`StartTag::normalize_quotes`]
//! are source text, already entity-encoded, so only the new `"` delimiter is
//! escaped.
//!
//! Swapping in a real HTML parser means replacing this module; the injection
//! pipeline only talks to these functions.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::Regex;

fn start_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9:-]*)([^>]*)>").expect("start tag regex"))
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute regex")
    })
}

fn raw_text_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(script|style)\b[^>]*>").expect("raw text open regex"))
}

fn script_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</script\s*>").expect("script close regex"))
}

fn style_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</style\s*>").expect("style close regex"))
}

// ---------------------------------------------------------------------------
// Raw text segmentation
// ---------------------------------------------------------------------------

/// A slice of a document, either markup or the body of a raw-text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Markup, including the opening and closing tags of raw-text elements.
    Markup(&'a str),
    /// Body of a `<script>` or `<style>` element.
    RawText(&'a str),
}

impl<'a> Segment<'a> {
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match self {
            Self::Markup(text) | Self::RawText(text) => *text,
        }
    }
}

/// Split `html` into markup and raw-text bodies.
///
/// An unterminated `<script>`/`<style>` body runs to the end of the input.
/// Concatenating the segments reproduces `html` exactly.
#[must_use]
pub fn split_raw_text(html: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut markup_start = 0;

    while let Some(open) = raw_text_open_regex().captures_at(html, markup_start) {
        let (Some(whole), Some(name)) = (open.get(0), open.get(1)) else {
            break;
        };
        let body_start = whole.end();
        segments.push(Segment::Markup(&html[markup_start..body_start]));

        let close = if name.as_str().eq_ignore_ascii_case("script") {
            script_close_regex()
        } else {
            style_close_regex()
        };
        match close.find_at(html, body_start) {
            Some(close) => {
                segments.push(Segment::RawText(&html[body_start..close.start()]));
                markup_start = close.start();
            }
            None => {
                segments.push(Segment::RawText(&html[body_start..]));
                markup_start = html.len();
                break;
            }
        }
    }

    if markup_start < html.len() {
        segments.push(Segment::Markup(&html[markup_start..]));
    }
    segments
}

// ---------------------------------------------------------------------------
// Start tags
// ---------------------------------------------------------------------------

/// How an attribute value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
    /// Attribute without a value (`<input disabled>`).
    Bare,
}

/// Pending edit of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rewrite {
    /// Source value moved from single to double quotes.
    Requoted,
    /// New plain-text value.
    Value(String),
}

/// One attribute of a parsed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
    quote: Quote,
    raw: &'a str,
    span: Range<usize>,
    rewritten: Option<Rewrite>,
}

impl<'a> Attribute<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Current value: the edited value if any, else the source value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.rewritten {
            Some(Rewrite::Value(value)) => Some(value),
            Some(Rewrite::Requoted) | None => self.value,
        }
    }

    #[must_use]
    pub const fn quote(&self) -> Quote {
        self.quote
    }

    /// Source text of the attribute, exactly as written.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.raw
    }
}

/// A parsed start tag that re-renders minimally.
///
/// Untouched tags render back to their exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    raw: &'a str,
    name: &'a str,
    attributes: Vec<Attribute<'a>>,
    attributes_end: usize,
    appended: Vec<(String, String)>,
}

impl<'a> StartTag<'a> {
    /// Parse one complete start tag such as `<img src="a.png" alt=x>`.
    #[must_use]
    pub fn parse(raw: &'a str) -> Option<Self> {
        let caps = start_tag_regex().captures(raw)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != raw.len() {
            return None;
        }
        let name = caps.get(1)?;
        let region = caps.get(2)?;

        let mut attributes = Vec::new();
        let mut attributes_end = name.end();
        for attr in attribute_regex().captures_iter(region.as_str()) {
            let (Some(matched), Some(attr_name)) = (attr.get(0), attr.get(1)) else {
                continue;
            };
            let (value, quote) = if let Some(value) = attr.get(2) {
                (Some(value.as_str()), Quote::Double)
            } else if let Some(value) = attr.get(3) {
                (Some(value.as_str()), Quote::Single)
            } else if let Some(value) = attr.get(4) {
                (Some(value.as_str()), Quote::Unquoted)
            } else {
                (None, Quote::Bare)
            };
            let span = region.start() + matched.start()..region.start() + matched.end();
            attributes_end = span.end;
            attributes.push(Attribute {
                name: attr_name.as_str(),
                value,
                quote,
                raw: matched.as_str(),
                span,
                rewritten: None,
            });
        }

        Some(Self {
            raw,
            name: name.as_str(),
            attributes,
            attributes_end,
            appended: Vec::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Case-insensitive tag name check.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute<'a>] {
        &self.attributes
    }

    /// Value of the first attribute called `name` (case-insensitive).
    /// Bare attributes yield `Some("")`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        if let Some(attr) = self
            .attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            return Some(attr.value().unwrap_or(""));
        }
        self.appended
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute value, appending the attribute when absent.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            attr.rewritten = Some(Rewrite::Value(value));
        } else if let Some(entry) = self
            .appended
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            entry.1 = value;
        } else {
            self.appended.push((name.to_string(), value));
        }
    }

    /// Re-quote single-quoted attribute values with double quotes.
    pub fn normalize_quotes(&mut self) {
        for attr in &mut self.attributes {
            if attr.quote == Quote::Single && attr.rewritten.is_none() {
                attr.rewritten = Some(Rewrite::Requoted);
            }
        }
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.appended.is_empty() || self.attributes.iter().any(|attr| attr.rewritten.is_some())
    }

    /// Render the tag, keeping untouched attributes byte-for-byte.
    #[must_use]
    pub fn render(&self) -> Cow<'a, str> {
        if !self.is_modified() {
            return Cow::Borrowed(self.raw);
        }

        let mut out = String::with_capacity(self.raw.len() + 32);
        let mut cursor = 0;
        for attr in &self.attributes {
            let Some(rewrite) = &attr.rewritten else {
                continue;
            };
            out.push_str(&self.raw[cursor..attr.span.start]);
            match rewrite {
                Rewrite::Value(value) => push_attribute(&mut out, attr.name, value),
                Rewrite::Requoted => {
                    let source = attr.value.unwrap_or("");
                    out.push_str(attr.name);
                    out.push_str("=\"");
                    out.push_str(&source.replace('"', "&quot;"));
                    out.push('"');
                }
            }
            cursor = attr.span.end;
        }
        out.push_str(&self.raw[cursor..self.attributes_end]);
        for (name, value) in &self.appended {
            out.push(' ');
            push_attribute(&mut out, name, value);
        }
        out.push_str(&self.raw[self.attributes_end..]);
        Cow::Owned(out)
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&v_htmlescape::escape(value).to_string());
    out.push('"');
}

/// Apply `edit` to every start tag outside raw-text bodies.
#[must_use]
pub fn rewrite_start_tags(html: &str, mut edit: impl FnMut(&mut StartTag<'_>)) -> String {
    let mut out = String::with_capacity(html.len());
    for segment in split_raw_text(html) {
        match segment {
            Segment::RawText(text) => out.push_str(text),
            Segment::Markup(text) => {
                let mut cursor = 0;
                for found in start_tag_regex().find_iter(text) {
                    out.push_str(&text[cursor..found.start()]);
                    match StartTag::parse(found.as_str()) {
                        Some(mut tag) => {
                            edit(&mut tag);
                            out.push_str(&tag.render());
                        }
                        None => out.push_str(found.as_str()),
                    }
                    cursor = found.end();
                }
                out.push_str(&text[cursor..]);
            }
        }
    }
    out
}

/// Find `<tag ...>` start tags whose text contains `needle` literally
/// (case-insensitive). Callers confirm exact attribute equality on the
/// returned tags.
///
/// Only markup is searched: tags spelled out inside `<script>`/`<style>`
/// bodies are text, not elements. Ranges index into `html`.
#[must_use]
pub fn find_start_tags<'h>(
    html: &'h str,
    tag: &str,
    needle: &str,
) -> Vec<(Range<usize>, StartTag<'h>)> {
    let pattern = format!(
        r"(?i)<{}\b[^>]*{}[^>]*>",
        regex_lite::escape(tag),
        regex_lite::escape(needle)
    );
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(error) => {
            tracing::debug!(%error, tag, "could not build tag pattern");
            return Vec::new();
        }
    };
    let mut tags = Vec::new();
    let mut offset = 0;
    for segment in split_raw_text(html) {
        if let Segment::Markup(text) = segment {
            for found in regex.find_iter(text) {
                if let Some(tag) = StartTag::parse(found.as_str()) {
                    tags.push((offset + found.start()..offset + found.end(), tag));
                }
            }
        }
        offset += segment.text().len();
    }
    tags
}
