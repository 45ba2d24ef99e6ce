//! End-to-end widget scenarios against the in-process channel.

use std::time::Duration;

use livepen_core::{
    ConsoleRelay, HostMessage, InProcessChannel, PaneKind, PreviewMessage, SandboxPort,
    WidgetConfig,
};
use livepen_layout::Unmeasured;
use livepen_runtime::{
    LongPressEvent, PreviewWidget, SharedSourceStore, SourceRole, WidgetProps,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn mount(props: WidgetProps) -> (PreviewWidget<InProcessChannel>, SandboxPort) {
    let (channel, port) = InProcessChannel::pair();
    let widget = PreviewWidget::new(
        ms(0),
        props,
        WidgetConfig::default(),
        channel,
        "preview-1",
        &Unmeasured,
    );
    (widget, port)
}

fn shared(source_id: &str) -> WidgetProps {
    WidgetProps {
        source_id: Some(source_id.to_string()),
        ..WidgetProps::default()
    }
}

#[test]
fn console_lines_replace_as_the_log_grows() {
    let (mut widget, port) = mount(WidgetProps {
        js: Some("console.log('x'); console.log('y')".to_string()),
        ..WidgetProps::default()
    });
    assert!(widget.preview().console_relay);

    let frame = widget.frame().clone();
    let mut relay = ConsoleRelay::default();

    port.post(&frame, &relay.log(&[json!("x")]));
    assert!(widget.receive().console_updated);
    assert_eq!(widget.console(), ["x"]);

    port.post(&frame, &relay.log(&[json!("y")]));
    widget.receive();
    assert_eq!(widget.console(), ["x", "y"]);
}

#[test]
fn reported_heights_keep_the_running_maximum() {
    let (mut widget, port) = mount(WidgetProps {
        html: Some("<p>tall</p>".to_string()),
        ..WidgetProps::default()
    });
    let frame = widget.frame().clone();
    let mut seen = Vec::new();
    for height in [300.0, 250.0, 700.0, 640.0] {
        port.post(&frame, &PreviewMessage::HeightChange { height });
        widget.receive();
        seen.push(widget.preview_height());
    }
    assert_eq!(seen, vec![300.0, 300.0, 700.0, 700.0]);
}

#[test]
fn long_press_resets_the_widget() {
    let (mut widget, port) = mount(WidgetProps {
        html: Some("<div id='t'></div>".to_string()),
        js: Some("console.log('x')".to_string()),
        ..WidgetProps::default()
    });
    widget.on_editor_change(ms(10), PaneKind::Js, "console.log('edited')", &Unmeasured);
    port.post(
        widget.frame(),
        &PreviewMessage::ConsoleLog {
            logs: vec!["edited".to_string()],
        },
    );
    widget.receive();
    let generation = widget.frame().generation();

    assert_eq!(widget.press_reset(ms(100)), Some(LongPressEvent::Started));
    let halfway = widget.tick(ms(600), &Unmeasured, || None);
    assert_eq!(halfway.long_press, Some(LongPressEvent::Progress(0.5)));
    assert!(!halfway.reset);

    let done = widget.tick(ms(1100), &Unmeasured, || None);
    assert_eq!(done.long_press, Some(LongPressEvent::Triggered));
    assert!(done.reset && done.remounted && done.console_cleared);
    assert_eq!(widget.document().js, "console.log('x')\n");
    assert!(widget.console().is_empty());
    assert_eq!(widget.frame().generation(), generation + 1);
    assert_eq!(widget.long_press().progress(), 0.0);
    assert!(port.take_requests().is_empty());

    // The fresh frame is nudged for its height once the reset settles.
    widget.tick(ms(1200), &Unmeasured, || None);
    assert_eq!(
        port.take_requests(),
        vec![(widget.frame().clone(), HostMessage::HeightRequest)]
    );
}

#[test]
fn early_release_leaves_edits_alone() {
    let (mut widget, _port) = mount(WidgetProps {
        html: Some("<p>a</p>".to_string()),
        ..WidgetProps::default()
    });
    widget.on_editor_change(ms(1), PaneKind::Html, "<p>b</p>", &Unmeasured);
    widget.press_reset(ms(10));
    widget.tick(ms(500), &Unmeasured, || None);
    let update = widget.release_reset(ms(600), &Unmeasured);
    assert_eq!(update.long_press, Some(LongPressEvent::Cancelled));
    assert!(!update.reset);
    assert_eq!(widget.document().html, "<p>b</p>\n");
    assert_eq!(widget.long_press().progress(), 0.0);
}

#[test]
fn consumers_adopt_the_provider_source() {
    let store = SharedSourceStore::new();
    let (mut provider, _) = mount(WidgetProps {
        html: Some("<p>a</p>".to_string()),
        css_path: Some("style.css".to_string()),
        ..shared("demo")
    });
    provider.attach_store(ms(0), store.clone(), "/guide", &Unmeasured);
    assert_eq!(provider.role(), SourceRole::Provider);

    let (mut consumer, _) = mount(WidgetProps {
        js_path: Some("main.js".to_string()),
        ..shared("demo")
    });
    let update = consumer.attach_store(ms(0), store.clone(), "/guide", &Unmeasured);
    assert_eq!(consumer.role(), SourceRole::Consumer);
    assert!(update.shared_adopted && update.remounted);
    assert_eq!(consumer.document().html, "<p>a</p>\n");
    assert_eq!(consumer.document().css_path.as_deref(), Some("style.css"));
    assert_eq!(consumer.document().js_path.as_deref(), Some("main.js"));

    let next = WidgetProps {
        html: Some("<p>b</p>".to_string()),
        ..provider.props().clone()
    };
    provider.set_props(ms(10), next, &Unmeasured);
    assert!(consumer.tick(ms(11), &Unmeasured, || None).shared_adopted);
    assert_eq!(consumer.document().html, "<p>b</p>\n");

    // The baseline keeps the first adopted value.
    assert_eq!(consumer.baseline().html, "<p>a</p>\n");
    consumer.reset(ms(20), &Unmeasured);
    assert_eq!(consumer.document().html, "<p>a</p>\n");
}

#[test]
fn sharing_is_scoped_to_the_page() {
    let store = SharedSourceStore::new();
    let (mut provider, _) = mount(WidgetProps {
        html: Some("<p>home</p>".to_string()),
        ..shared("demo")
    });
    provider.attach_store(ms(0), store.clone(), "/home", &Unmeasured);

    let (mut elsewhere, _) = mount(shared("demo"));
    let update = elsewhere.attach_store(ms(0), store, "/about", &Unmeasured);
    assert!(!update.shared_adopted);
    assert_eq!(elsewhere.document().html, "");
}

#[test]
fn unmounted_consumers_stop_listening() {
    let store = SharedSourceStore::new();
    let (mut consumer, _) = mount(shared("demo"));
    consumer.attach_store(ms(0), store.clone(), "/", &Unmeasured);
    let key = livepen_runtime::ScopedId::new("demo", "/");
    assert_eq!(store.listener_count(&key), 1);
    consumer.unmount();
    assert_eq!(store.listener_count(&key), 0);
    assert_eq!(consumer.role(), SourceRole::Standalone);
}
