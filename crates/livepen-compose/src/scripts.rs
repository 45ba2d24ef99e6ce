//! Instrumentation scripts injected into the sandboxed frame.
//!
//! The console relay mirrors the rendering rules in
//! [`livepen_core::console`]; the height observer reports monotonically
//! growing content heights. Both post the wire shapes defined in
//! [`livepen_core::protocol`] as JSON text, and the height observer expects
//! host messages as JSON text too.

use livepen_core::ConsoleConfig;

/// Attribute tagging instrumentation scripts so duplicates can be found.
pub const INSTRUMENTATION_ATTRIBUTE: &str = "data-livepen-instrumentation";

const STRING_BUDGET_SLOT: &str = "__LIVEPEN_STRING_BUDGET__";
const MARKUP_BUDGET_SLOT: &str = "__LIVEPEN_MARKUP_BUDGET__";

const CONSOLE_RELAY_TEMPLATE: &str = r#"(function () {
  var self = document.currentScript;
  var stray = document.querySelectorAll('script[data-livepen-instrumentation]');
  Array.prototype.forEach.call(stray, function (node) {
    if (node !== self && node.parentNode) { node.parentNode.removeChild(node); }
  });
  if (window.__livepenConsole) { return; }
  window.__livepenConsole = true;

  var STRING_BUDGET = __LIVEPEN_STRING_BUDGET__;
  var MARKUP_BUDGET = __LIVEPEN_MARKUP_BUDGET__;
  var logs = [];

  function truncate(text, budget) {
    return text.length > budget ? text.slice(0, budget) + '...' : text;
  }

  function summarize(el) {
    var label = el.tagName.toLowerCase();
    if (el.id) { label += '#' + el.id; }
    if (typeof el.className === 'string' && el.className.trim()) {
      label += '.' + el.className.trim().split(/\s+/).join('.');
    }
    return '<' + label + '>';
  }

  function renderNode(node) {
    switch (node.nodeType) {
      case 1:
        try { return truncate(node.outerHTML, MARKUP_BUDGET); } catch (e) { return summarize(node); }
      case 3: return '"' + truncate(node.textContent.trim(), STRING_BUDGET) + '"';
      case 8: return '<' + '!--' + node.textContent + '--' + '>';
      case 9: return '[Document]';
      case 11: return '[DocumentFragment]';
      default: return String(node);
    }
  }

  function render(value) {
    try {
      if (value === null) { return 'null'; }
      if (value === undefined) { return 'undefined'; }
      if (typeof value === 'string') { return '"' + truncate(value, STRING_BUDGET) + '"'; }
      if (typeof value === 'number' || typeof value === 'boolean') { return String(value); }
      if (typeof value === 'function') { return '[Function]'; }
      if (Array.isArray(value)) { return '[' + value.map(render).join(', ') + ']'; }
      if (value instanceof NodeList || value instanceof HTMLCollection) {
        return '[' + Array.prototype.map.call(value, render).join(', ') + ']';
      }
      if (value instanceof Node) { return renderNode(value); }
      return '{' + Object.keys(value).map(function (key) {
        return key + ': ' + render(value[key]);
      }).join(', ') + '}';
    } catch (e) {
      try { return String(value); } catch (ignored) { return typeof value; }
    }
  }

  function renderArguments(args) {
    return Array.prototype.map.call(args, function (arg) {
      return typeof arg === 'string' ? arg : render(arg);
    }).join(' ');
  }

  function post() {
    try {
      window.parent.postMessage(JSON.stringify({ type: 'consoleLog', logs: logs.slice() }), '*');
    } catch (e) {}
  }

  var originalLog = console.log;
  var originalError = console.error;
  console.log = function () {
    originalLog.apply(console, arguments);
    logs.push(renderArguments(arguments));
    post();
  };
  console.error = function () {
    originalError.apply(console, arguments);
    logs.push('[error] ' + renderArguments(arguments));
    post();
  };
  window.addEventListener('error', function (event) {
    logs.push('[error] ' + event.message + (event.lineno ? ' (line ' + event.lineno + ')' : ''));
    post();
  });
})();"#;

const HEIGHT_OBSERVER_SCRIPT: &str = r#"(function () {
  if (window.__livepenHeight) { return; }
  window.__livepenHeight = true;

  var maxHeight = 0;
  var pending = false;

  function measure() {
    var body = document.body;
    var root = document.documentElement;
    return Math.max(
      body ? body.scrollHeight : 0,
      body ? body.offsetHeight : 0,
      root ? root.scrollHeight : 0,
      root ? root.offsetHeight : 0
    );
  }

  function post() {
    try {
      window.parent.postMessage(JSON.stringify({ type: 'heightChange', height: maxHeight }), '*');
    } catch (e) {}
  }

  function check() {
    var height = measure();
    if (height > maxHeight) {
      maxHeight = height;
      post();
    }
  }

  function schedule() {
    if (pending) { return; }
    pending = true;
    setTimeout(function () { pending = false; check(); }, 0);
  }

  function observe() {
    if (typeof MutationObserver !== 'undefined') {
      new MutationObserver(schedule).observe(document.body, {
        childList: true, subtree: true, attributes: true, characterData: true
      });
    }
    if (typeof ResizeObserver !== 'undefined') {
      new ResizeObserver(schedule).observe(document.body);
    }
    schedule();
  }

  if (document.body) { observe(); } else { document.addEventListener('DOMContentLoaded', observe); }
  window.addEventListener('load', check);
  window.addEventListener('message', function (event) {
    if (event.source !== window.parent || typeof event.data !== 'string') { return; }
    var message;
    try { message = JSON.parse(event.data); } catch (e) { return; }
    if (!message || message.type !== 'heightRequest') { return; }
    check();
    post();
  });
})();"#;

/// Kind of instrumentation script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrumentation {
    Console,
    Height,
}

impl Instrumentation {
    /// Value of [`INSTRUMENTATION_ATTRIBUTE`] for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Height => "height",
        }
    }
}

/// Console relay source with the configured budgets substituted.
#[must_use]
pub fn console_relay_script(config: &ConsoleConfig) -> String {
    CONSOLE_RELAY_TEMPLATE
        .replace(STRING_BUDGET_SLOT, &config.string_budget.to_string())
        .replace(MARKUP_BUDGET_SLOT, &config.markup_budget.to_string())
}

#[must_use]
pub const fn height_observer_script() -> &'static str {
    HEIGHT_OBSERVER_SCRIPT
}

/// Wrap instrumentation source in a tagged `<script>` element.
#[must_use]
pub fn instrumentation_tag(kind: Instrumentation, source: &str) -> String {
    format!(
        "<script {INSTRUMENTATION_ATTRIBUTE}=\"{}\">\n{source}\n</script>",
        kind.as_str()
    )
}
