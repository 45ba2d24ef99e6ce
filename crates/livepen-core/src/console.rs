//! Console relay rendering rules.
//!
//! The in-frame relay script renders every `console.log` / `console.error`
//! argument to a string, appends the line to an accumulating log and posts
//! the whole log to the host. This module mirrors those rules for values that
//! have a JSON shape, and provides [`ConsoleRelay`], the accumulator used by
//! in-process sandboxes. DOM nodes and functions only exist inside the frame;
//! their placeholders are exported as constants so the script and the host
//! agree on them.

use serde_json::Value;

use crate::protocol::PreviewMessage;

/// Character budget for quoted strings nested inside rendered values.
pub const DEFAULT_STRING_BUDGET: usize = 100;
/// Character budget for rendered element markup.
pub const DEFAULT_MARKUP_BUDGET: usize = 200;
/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";
/// Placeholder rendered for function values.
pub const FUNCTION_PLACEHOLDER: &str = "[Function]";
/// Placeholder rendered for document nodes.
pub const DOCUMENT_PLACEHOLDER: &str = "[Document]";
/// Placeholder rendered for document fragments.
pub const FRAGMENT_PLACEHOLDER: &str = "[DocumentFragment]";
/// Prefix for entries produced by `console.error` and uncaught errors.
pub const ERROR_PREFIX: &str = "[error]";

/// Truncate `text` to `budget` characters, appending [`ELLIPSIS`] when cut.
#[must_use]
pub fn truncate(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Render one nested value.
///
/// Strings are quoted and truncated, arrays are rendered element-wise inside
/// brackets, objects as `{key: value}` pairs.
#[must_use]
pub fn render_value(value: &Value, string_budget: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("\"{}\"", truncate(text, string_budget)),
        Value::Array(items) => {
            let inner = items
                .iter()
                .map(|item| render_value(item, string_budget))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{inner}]")
        }
        Value::Object(fields) => {
            let inner = fields
                .iter()
                .map(|(key, item)| format!("{key}: {}", render_value(item, string_budget)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{inner}}}")
        }
    }
}

/// Render the argument list of one console call.
///
/// Top-level strings are printed as-is, like a browser console; every other
/// argument goes through [`render_value`]. Arguments are joined by a space.
#[must_use]
pub fn render_arguments(args: &[Value], string_budget: usize) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(text) => text.clone(),
            other => render_value(other, string_budget),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format an uncaught error entry: `[error] message (line N)`.
#[must_use]
pub fn format_error_entry(message: &str, line: Option<u32>) -> String {
    match line {
        Some(line) => format!("{ERROR_PREFIX} {message} (line {line})"),
        None => format!("{ERROR_PREFIX} {message}"),
    }
}

/// Accumulating console log, as kept inside the frame.
///
/// Every call returns the message the frame posts: the *entire* log so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleRelay {
    entries: Vec<String>,
    string_budget: usize,
}

impl Default for ConsoleRelay {
    fn default() -> Self {
        Self::new(DEFAULT_STRING_BUDGET)
    }
}

impl ConsoleRelay {
    #[must_use]
    pub fn new(string_budget: usize) -> Self {
        Self {
            entries: Vec::new(),
            string_budget,
        }
    }

    /// Record a `console.log` call.
    pub fn log(&mut self, args: &[Value]) -> PreviewMessage {
        let line = render_arguments(args, self.string_budget);
        self.push(line)
    }

    /// Record a `console.error` call.
    pub fn error(&mut self, args: &[Value]) -> PreviewMessage {
        let line = format!(
            "{ERROR_PREFIX} {}",
            render_arguments(args, self.string_budget)
        );
        self.push(line)
    }

    /// Record an uncaught error reported by the global error handler.
    pub fn uncaught(&mut self, message: &str, line: Option<u32>) -> PreviewMessage {
        self.push(format_error_entry(message, line))
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    fn push(&mut self, line: String) -> PreviewMessage {
        self.entries.push(line);
        PreviewMessage::ConsoleLog {
            logs: self.entries.clone(),
        }
    }
}
