//! The live preview widget controller.
//!
//! [`PreviewWidget`] owns one widget instance's state: the edited
//! [`SourceDocument`], its reset baseline, the composed preview and the
//! identity of the frame running it, the displayed console lines, the split
//! layout and both height controllers. The host feeds it props, editor
//! callbacks, inbound frame messages and its monotonic clock; every entry
//! point returns a [`WidgetUpdate`] describing what the host must re-render.
//!
//! Replacing the preview always mounts a new frame generation, so messages
//! and load events from a superseded frame are dropped on arrival.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use livepen_compose::{PreviewComposer, PreviewDocument};
use livepen_core::source::normalize_code;
use livepen_core::{
    FrameId, HostMessage, ImageMap, MessageChannel, MinHeightSetting, PaneKind, PaneVisibility,
    PreviewMessage, ResolvedVisibility, SourceDocument, Theme, Timer, WidgetConfig,
};
use livepen_layout::{
    EditorHeightController, EditorMetrics, HeightTrigger, PreviewHeightController,
    ResizeDispatch, SplitLayout,
};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::long_press::{LongPressController, LongPressEvent};
use crate::store::{ScopedId, SharedSourceStore, Subscription, WriterId};

/// Props supplied by the hosting application.
///
/// `None` means "not supplied". Only supplied source fields are explicit:
/// they override shared values and are never adopted from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetProps {
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub html_path: Option<String>,
    pub css_path: Option<String>,
    pub js_path: Option<String>,
    pub images: Option<ImageMap>,
    pub visibility: PaneVisibility,
    pub min_height: Option<MinHeightSetting>,
    pub theme: Theme,
    /// Cross-instance sharing identifier.
    pub source_id: Option<String>,
}

impl WidgetProps {
    #[must_use]
    pub fn has_explicit_code(&self) -> bool {
        self.html.is_some() || self.css.is_some() || self.js.is_some()
    }

    /// Whether an instance with these props provides its shared source.
    #[must_use]
    pub fn is_provider(&self) -> bool {
        self.source_id.is_some() && self.has_explicit_code()
    }

    /// Document built from the supplied fields, with empty code elsewhere.
    #[must_use]
    pub fn document(&self) -> SourceDocument {
        SourceDocument {
            html: normalize_code(self.html.as_deref().unwrap_or_default()),
            css: normalize_code(self.css.as_deref().unwrap_or_default()),
            js: normalize_code(self.js.as_deref().unwrap_or_default()),
            html_path: self.html_path.clone(),
            css_path: self.css_path.clone(),
            js_path: self.js_path.clone(),
            images: self.images.clone(),
        }
    }
}

/// One shareable field of a [`SourceDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    Html,
    Css,
    Js,
    HtmlPath,
    CssPath,
    JsPath,
    Images,
}

impl SourceField {
    pub const ALL: [Self; 7] = [
        Self::Html,
        Self::Css,
        Self::Js,
        Self::HtmlPath,
        Self::CssPath,
        Self::JsPath,
        Self::Images,
    ];

    /// The code pane this field holds, if it is a code field.
    #[must_use]
    pub const fn pane(self) -> Option<PaneKind> {
        match self {
            Self::Html => Some(PaneKind::Html),
            Self::Css => Some(PaneKind::Css),
            Self::Js => Some(PaneKind::Js),
            Self::HtmlPath | Self::CssPath | Self::JsPath | Self::Images => None,
        }
    }

    #[must_use]
    pub const fn is_explicit(self, props: &WidgetProps) -> bool {
        match self {
            Self::Html => props.html.is_some(),
            Self::Css => props.css.is_some(),
            Self::Js => props.js.is_some(),
            Self::HtmlPath => props.html_path.is_some(),
            Self::CssPath => props.css_path.is_some(),
            Self::JsPath => props.js_path.is_some(),
            Self::Images => props.images.is_some(),
        }
    }

    fn differs(self, a: &SourceDocument, b: &SourceDocument) -> bool {
        match self {
            Self::Html => a.html != b.html,
            Self::Css => a.css != b.css,
            Self::Js => a.js != b.js,
            Self::HtmlPath => a.html_path != b.html_path,
            Self::CssPath => a.css_path != b.css_path,
            Self::JsPath => a.js_path != b.js_path,
            Self::Images => a.images != b.images,
        }
    }

    fn copy(self, from: &SourceDocument, to: &mut SourceDocument) {
        match self {
            Self::Html => to.html.clone_from(&from.html),
            Self::Css => to.css.clone_from(&from.css),
            Self::Js => to.js.clone_from(&from.js),
            Self::HtmlPath => to.html_path.clone_from(&from.html_path),
            Self::CssPath => to.css_path.clone_from(&from.css_path),
            Self::JsPath => to.js_path.clone_from(&from.js_path),
            Self::Images => to.images.clone_from(&from.images),
        }
    }
}

impl From<PaneKind> for SourceField {
    fn from(pane: PaneKind) -> Self {
        match pane {
            PaneKind::Html => Self::Html,
            PaneKind::Css => Self::Css,
            PaneKind::Js => Self::Js,
        }
    }
}

/// How a widget takes part in source sharing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Not attached to a store, or no identifier.
    Standalone,
    /// Writes its explicit fields to the store.
    Provider,
    /// Adopts stored fields it was not given.
    Consumer,
}

/// What the host hands to one hosted code editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorBinding<'a> {
    pub pane: PaneKind,
    pub language_id: &'static str,
    pub value: &'a str,
    pub theme: Theme,
}

/// What changed during one widget call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WidgetUpdate {
    /// A new frame generation was composed; render [`PreviewWidget::preview`].
    pub remounted: bool,
    pub console_cleared: bool,
    pub console_updated: bool,
    pub layout: Option<ResizeDispatch>,
    pub editor_height: Option<f64>,
    pub preview_height_changed: bool,
    pub reset: bool,
    pub long_press: Option<LongPressEvent>,
    pub shared_adopted: bool,
}

impl WidgetUpdate {
    fn absorb(&mut self, later: Self) {
        self.remounted |= later.remounted;
        self.console_cleared |= later.console_cleared;
        self.console_updated |= later.console_updated;
        self.layout = merge_dispatch(self.layout, later.layout);
        self.editor_height = later.editor_height.or(self.editor_height);
        self.preview_height_changed |= later.preview_height_changed;
        self.reset |= later.reset;
        self.long_press = later.long_press.or(self.long_press);
        self.shared_adopted |= later.shared_adopted;
    }
}

/// Keep the later dispatch, but never lose a pending style command.
fn merge_dispatch(
    earlier: Option<ResizeDispatch>,
    later: Option<ResizeDispatch>,
) -> Option<ResizeDispatch> {
    match (earlier, later) {
        (Some(earlier), Some(mut later)) => {
            if later.style_command.is_none() {
                later.style_command = earlier.style_command;
            }
            Some(later)
        }
        (earlier, later) => later.or(earlier),
    }
}

#[derive(Debug)]
struct Sharing {
    store: SharedSourceStore,
    key: ScopedId,
    page_path: String,
    writer: WriterId,
    seen_version: Option<u64>,
    /// Set by the store listener; drained on the next tick.
    pending: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
}

/// One live preview widget.
#[derive(Debug)]
pub struct PreviewWidget<C> {
    config: WidgetConfig,
    base_min_height: f64,
    props: WidgetProps,
    document: SourceDocument,
    baseline: SourceDocument,
    adopted: FxHashSet<SourceField>,
    visibility: ResolvedVisibility,
    composer: PreviewComposer,
    frame: FrameId,
    preview: PreviewDocument,
    console: Vec<String>,
    channel: C,
    layout: SplitLayout,
    editor_height: EditorHeightController,
    preview_height: PreviewHeightController,
    long_press: LongPressController,
    reset_settle: Timer,
    sharing: Option<Sharing>,
}

impl<C: MessageChannel> PreviewWidget<C> {
    /// Mount a widget and compose its first frame.
    pub fn new(
        now: Duration,
        props: WidgetProps,
        mut config: WidgetConfig,
        channel: C,
        iframe_id: impl Into<String>,
        metrics: &dyn EditorMetrics,
    ) -> Self {
        let base_min_height = config.preview_height.min_height;
        config.apply_min_height(props.min_height.as_ref());

        let document = props.document();
        let visibility = props.visibility.resolve(&document);
        let composer = PreviewComposer::new(config.console);
        let frame = FrameId::new(iframe_id);
        let preview = composer.compose(&document, &visibility, &frame);

        let mut layout = SplitLayout::new(config.layout);
        layout.sync_panels(&visibility.visible_panes(), metrics);
        let mut editor_height = EditorHeightController::new(config.editor_height);
        editor_height.invalidate(now, HeightTrigger::Explicit);

        tracing::debug!(%frame, panes = visibility.visible_panes().len(), "widget mounted");
        Self {
            preview_height: PreviewHeightController::new(config.preview_height.clone()),
            long_press: LongPressController::new(config.long_press),
            base_min_height,
            baseline: document.clone(),
            document,
            props,
            adopted: FxHashSet::default(),
            visibility,
            composer,
            frame,
            preview,
            console: Vec::new(),
            channel,
            layout,
            editor_height,
            reset_settle: Timer::idle(),
            sharing: None,
            config,
        }
    }

    #[must_use]
    pub const fn props(&self) -> &WidgetProps {
        &self.props
    }

    #[must_use]
    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// The code currently shown in the editors.
    #[must_use]
    pub const fn document(&self) -> &SourceDocument {
        &self.document
    }

    /// The code a reset restores.
    #[must_use]
    pub const fn baseline(&self) -> &SourceDocument {
        &self.baseline
    }

    #[must_use]
    pub const fn visibility(&self) -> &ResolvedVisibility {
        &self.visibility
    }

    /// The document to load into the current frame.
    #[must_use]
    pub const fn preview(&self) -> &PreviewDocument {
        &self.preview
    }

    #[must_use]
    pub const fn frame(&self) -> &FrameId {
        &self.frame
    }

    #[must_use]
    pub fn console(&self) -> &[String] {
        &self.console
    }

    #[must_use]
    pub const fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    /// Divider interactions go straight to the layout.
    pub fn layout_mut(&mut self) -> &mut SplitLayout {
        &mut self.layout
    }

    #[must_use]
    pub const fn editor_height(&self) -> f64 {
        self.editor_height.height()
    }

    #[must_use]
    pub fn preview_height(&self) -> f64 {
        self.preview_height.displayed()
    }

    #[must_use]
    pub const fn long_press(&self) -> &LongPressController {
        &self.long_press
    }

    #[must_use]
    pub fn role(&self) -> SourceRole {
        match &self.sharing {
            None => SourceRole::Standalone,
            Some(_) if self.props.is_provider() => SourceRole::Provider,
            Some(_) => SourceRole::Consumer,
        }
    }

    /// Binding for one hosted editor, or `None` when the pane is hidden.
    #[must_use]
    pub fn editor_binding(&self, pane: PaneKind) -> Option<EditorBinding<'_>> {
        self.visibility.pane(pane).then(|| EditorBinding {
            pane,
            language_id: pane.language_id(),
            value: self.document.code(pane),
            theme: self.props.theme,
        })
    }

    /// Join the shared source for this widget's identifier on `page_path`.
    ///
    /// Providers publish immediately. Consumers subscribe and adopt whatever
    /// is already stored. Without an identifier the widget stays standalone.
    pub fn attach_store(
        &mut self,
        now: Duration,
        store: SharedSourceStore,
        page_path: &str,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        self.detach_store();
        let Some(source_id) = self.props.source_id.as_deref() else {
            tracing::debug!("no source identifier, staying standalone");
            return WidgetUpdate::default();
        };
        let key = ScopedId::new(source_id, page_path);
        let pending = Rc::new(Cell::new(false));
        let subscription = (!self.props.is_provider()).then(|| {
            let inbox = Rc::clone(&pending);
            store.subscribe(&key, move |_, _| inbox.set(true))
        });
        self.sharing = Some(Sharing {
            writer: store.register_writer(),
            store,
            key,
            page_path: page_path.to_string(),
            seen_version: None,
            pending,
            subscription,
        });

        if self.props.is_provider() {
            self.publish();
            WidgetUpdate::default()
        } else {
            self.adopt_shared(now, metrics)
        }
    }

    /// Leave the shared source, unsubscribing if needed.
    pub fn detach_store(&mut self) {
        if let Some(sharing) = self.sharing.take() {
            tracing::trace!(key = %sharing.key, "left shared source");
        }
    }

    /// Apply new props.
    pub fn set_props(
        &mut self,
        now: Duration,
        props: WidgetProps,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        let previous = std::mem::replace(&mut self.props, props);
        let before = previous.document();
        let after = self.props.document();

        let mut props_changed = false;
        let mut touched = Vec::new();
        for field in SourceField::ALL {
            if !field.is_explicit(&self.props)
                || (field.is_explicit(&previous) && !field.differs(&before, &after))
            {
                continue;
            }
            props_changed = true;
            field.copy(&after, &mut self.baseline);
            if field.differs(&after, &self.document) {
                field.copy(&after, &mut self.document);
                touched.push(field);
            }
        }

        let mut update = WidgetUpdate::default();
        if previous.min_height != self.props.min_height {
            self.config.preview_height.min_height = self.base_min_height;
            self.config.apply_min_height(self.props.min_height.as_ref());
            self.preview_height
                .set_min_height(self.config.preview_height.min_height);
            update.preview_height_changed = true;
        }

        update.absorb(self.source_changed(now, &touched, metrics));
        if touched.is_empty() && previous.visibility != self.props.visibility {
            let composed_for = (self.visibility.preview, self.visibility.console);
            update.layout = merge_dispatch(update.layout, self.refresh_visibility(now, metrics));
            if (self.visibility.preview, self.visibility.console) != composed_for {
                self.remount("visibility changed");
                update.remounted = true;
            }
        }

        let role_changed = previous.source_id != self.props.source_id
            || previous.is_provider() != self.props.is_provider();
        if role_changed {
            if let Some(sharing) = self.sharing.take() {
                let Sharing {
                    store, page_path, ..
                } = sharing;
                update.absorb(self.attach_store(now, store, &page_path, metrics));
            }
        } else if props_changed {
            self.publish();
        }
        update
    }

    /// A hosted editor finished mounting.
    pub fn on_editor_mounted(
        &mut self,
        now: Duration,
        pane: PaneKind,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        tracing::trace!(?pane, "editor mounted");
        self.editor_height.invalidate(now, HeightTrigger::Explicit);
        WidgetUpdate {
            layout: Some(self.layout.refit(metrics)),
            ..WidgetUpdate::default()
        }
    }

    /// A hosted editor reported new text.
    pub fn on_editor_change(
        &mut self,
        now: Duration,
        pane: PaneKind,
        text: &str,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        if !self.document.set_code(pane, text) {
            return WidgetUpdate::default();
        }
        let mut update = self.source_changed(now, &[SourceField::from(pane)], metrics);
        update.layout = merge_dispatch(update.layout, Some(self.layout.refit(metrics)));
        update
    }

    /// The container or window changed size.
    pub fn window_resized(
        &mut self,
        now: Duration,
        container_px: Option<f64>,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        self.layout.set_container_width(container_px);
        self.editor_height.invalidate(now, HeightTrigger::WindowResize);
        WidgetUpdate {
            layout: Some(self.layout.refit(metrics)),
            ..WidgetUpdate::default()
        }
    }

    /// Drain inbound frame messages.
    pub fn receive(&mut self) -> WidgetUpdate {
        let mut update = WidgetUpdate::default();
        while let Some(envelope) = self.channel.recv() {
            if envelope.source != self.frame {
                tracing::trace!(
                    source = %envelope.source,
                    current = %self.frame,
                    "dropping message from a superseded frame"
                );
                continue;
            }
            match envelope.decode() {
                Ok(PreviewMessage::ConsoleLog { logs }) => {
                    if self.console != logs {
                        self.console = logs;
                        update.console_updated = true;
                    }
                }
                Ok(PreviewMessage::HeightChange { height }) => {
                    update.preview_height_changed |= self.preview_height.observe(height);
                }
                Err(error) => tracing::trace!(%error, "ignoring undecodable frame message"),
            }
        }
        update
    }

    /// Ask the current frame to re-report its height. Delivery failures are
    /// expected while frames are torn down and are only logged.
    pub fn request_height(&mut self) -> bool {
        match self.channel.send(&self.frame, &HostMessage::HeightRequest) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, "height request not delivered");
                false
            }
        }
    }

    /// A frame finished loading, with its measured content height if the
    /// host could read it.
    pub fn frame_loaded(
        &mut self,
        now: Duration,
        frame: &FrameId,
        measured: Option<f64>,
    ) -> WidgetUpdate {
        if *frame != self.frame {
            tracing::trace!(%frame, current = %self.frame, "ignoring load of a superseded frame");
            return WidgetUpdate::default();
        }
        let preview_height_changed = self.preview_height.frame_loaded(now, measured);
        self.request_height();
        WidgetUpdate {
            preview_height_changed,
            ..WidgetUpdate::default()
        }
    }

    /// Advance every timer-driven part of the widget.
    ///
    /// `measure_frame` reads the current frame's content height and is
    /// called at most once.
    pub fn tick(
        &mut self,
        now: Duration,
        metrics: &dyn EditorMetrics,
        measure_frame: impl FnOnce() -> Option<f64>,
    ) -> WidgetUpdate {
        let mut update = WidgetUpdate::default();

        if self
            .sharing
            .as_ref()
            .is_some_and(|sharing| sharing.pending.replace(false))
        {
            update.absorb(self.adopt_shared(now, metrics));
        }

        update.absorb(self.receive());

        if let Some(event) = self.long_press.tick(now) {
            if matches!(event, LongPressEvent::Triggered) {
                update.absorb(self.reset(now, metrics));
            }
            update.long_press = Some(event);
        }

        if self.reset_settle.fire(now) {
            self.editor_height.invalidate(now, HeightTrigger::Explicit);
            self.request_height();
            update.layout = merge_dispatch(update.layout, Some(self.layout.refit(metrics)));
        }

        let panes = self.visibility.visible_panes();
        if let Some(height) = self.editor_height.tick(now, &self.document, &panes, metrics) {
            update.editor_height = Some(height);
        }
        update.preview_height_changed |= self.preview_height.tick(now, measure_frame);
        update
    }

    /// Reset control pressed.
    pub fn press_reset(&mut self, now: Duration) -> Option<LongPressEvent> {
        self.long_press.press(now)
    }

    /// Reset control released.
    pub fn release_reset(&mut self, now: Duration, metrics: &dyn EditorMetrics) -> WidgetUpdate {
        let event = self.long_press.release(now);
        self.finish_press(now, event, metrics)
    }

    /// Pointer left the reset control.
    pub fn leave_reset(&mut self, now: Duration, metrics: &dyn EditorMetrics) -> WidgetUpdate {
        let event = self.long_press.leave(now);
        self.finish_press(now, event, metrics)
    }

    fn finish_press(
        &mut self,
        now: Duration,
        event: Option<LongPressEvent>,
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        let mut update = if matches!(event, Some(LongPressEvent::Triggered)) {
            self.reset(now, metrics)
        } else {
            WidgetUpdate::default()
        };
        update.long_press = event;
        update
    }

    /// Restore the baseline code, clear the console and start a fresh frame.
    ///
    /// Heights are recomputed once the reset settle delay has passed.
    pub fn reset(&mut self, now: Duration, metrics: &dyn EditorMetrics) -> WidgetUpdate {
        let mut restored = false;
        for pane in PaneKind::ALL {
            restored |= self.document.set_code(pane, self.baseline.code(pane));
        }
        self.console.clear();
        let layout = self.refresh_visibility(now, metrics);
        self.remount("reset");
        self.reset_settle.arm(now, self.config.reset_settle_delay);
        tracing::debug!(frame = %self.frame, restored, "widget reset");
        WidgetUpdate {
            remounted: true,
            console_cleared: true,
            layout,
            reset: true,
            ..WidgetUpdate::default()
        }
    }

    /// Tear down: clear timers, leave the store and end any live drag.
    ///
    /// Returns the style restore command when a drag was interrupted.
    pub fn unmount(&mut self) -> Option<ResizeDispatch> {
        self.long_press.cancel();
        self.reset_settle.cancel();
        self.editor_height.cancel();
        self.preview_height.reset();
        self.detach_store();
        tracing::debug!(frame = %self.frame, "widget unmounted");
        self.layout.force_cancel()
    }

    fn publish(&mut self) {
        if !self.props.is_provider() {
            return;
        }
        let Some(sharing) = self.sharing.as_mut() else {
            return;
        };
        let explicit = self.props.document();
        let mut merged = sharing
            .store
            .get(&sharing.key)
            .map(|entry| entry.state)
            .unwrap_or_default();
        for field in SourceField::ALL {
            if field.is_explicit(&self.props) {
                field.copy(&explicit, &mut merged);
            }
        }
        let version = sharing
            .store
            .write(&sharing.key, sharing.writer, sharing.seen_version, merged);
        sharing.seen_version = Some(version);
        let listeners = sharing.store.notify(&sharing.key);
        tracing::debug!(key = %sharing.key, version, listeners, "published shared source");
    }

    fn adopt_shared(&mut self, now: Duration, metrics: &dyn EditorMetrics) -> WidgetUpdate {
        let Some(sharing) = self.sharing.as_mut() else {
            return WidgetUpdate::default();
        };
        let Some(entry) = sharing.store.get(&sharing.key) else {
            return WidgetUpdate::default();
        };
        if sharing.seen_version == Some(entry.version) {
            return WidgetUpdate::default();
        }
        sharing.seen_version = Some(entry.version);

        let mut touched = Vec::new();
        for field in SourceField::ALL {
            if field.is_explicit(&self.props) || !field.differs(&entry.state, &self.document) {
                continue;
            }
            field.copy(&entry.state, &mut self.document);
            if self.adopted.insert(field) {
                field.copy(&entry.state, &mut self.baseline);
            }
            touched.push(field);
        }
        if touched.is_empty() {
            return WidgetUpdate::default();
        }
        tracing::debug!(
            key = %sharing.key,
            version = entry.version,
            fields = touched.len(),
            "adopted shared source"
        );

        let mut update = self.source_changed(now, &touched, metrics);
        update.shared_adopted = true;
        update
    }

    fn source_changed(
        &mut self,
        now: Duration,
        touched: &[SourceField],
        metrics: &dyn EditorMetrics,
    ) -> WidgetUpdate {
        let mut update = WidgetUpdate::default();
        if touched.is_empty() {
            return update;
        }
        if touched
            .iter()
            .any(|field| matches!(field, SourceField::Html | SourceField::Js))
        {
            self.console.clear();
            update.console_cleared = true;
        }
        if touched.iter().any(|field| field.pane().is_some()) {
            self.editor_height.invalidate(now, HeightTrigger::Content);
        }
        update.layout = self.refresh_visibility(now, metrics);
        self.remount("source changed");
        update.remounted = true;
        update
    }

    fn refresh_visibility(
        &mut self,
        now: Duration,
        metrics: &dyn EditorMetrics,
    ) -> Option<ResizeDispatch> {
        let resolved = self.props.visibility.resolve(&self.document);
        if resolved != self.visibility {
            self.visibility = resolved;
            self.editor_height.invalidate(now, HeightTrigger::Visibility);
        }
        self.layout
            .sync_panels(&self.visibility.visible_panes(), metrics)
    }

    fn remount(&mut self, reason: &'static str) {
        self.frame = self.frame.next_generation();
        self.preview_height.reset();
        self.preview = self
            .composer
            .compose(&self.document, &self.visibility, &self.frame);
        tracing::debug!(frame = %self.frame, reason, "preview frame remounted");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use livepen_core::{
        ConsoleRelay, HostMessage, InProcessChannel, MinHeightSetting, PaneKind, PreviewMessage,
        SandboxPort, Theme, WidgetConfig,
    };
    use livepen_layout::{DividerId, GlobalStyleCommand, Unmeasured};
    use serde_json::json;

    use super::{EditorBinding, PreviewWidget, SourceRole, WidgetProps};

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
            "preview",
            &Unmeasured,
        );
        (widget, port)
    }

    fn props(html: &str, js: &str) -> WidgetProps {
        WidgetProps {
            html: Some(html.to_string()),
            js: Some(js.to_string()),
            ..WidgetProps::default()
        }
    }

    #[test]
    fn mount_composes_generation_zero() {
        let (widget, _port) = mount(props("<p>hi</p>", ""));
        assert_eq!(widget.frame().generation(), 0);
        assert!(widget.preview().html.contains("<p>hi</p>"));
        assert_eq!(widget.role(), SourceRole::Standalone);
        assert_eq!(widget.layout().widths().len(), 1);
    }

    #[test]
    fn editing_markup_remounts_and_clears_console() {
        let (mut widget, port) = mount(props("<p>a</p>", "console.log(1)"));
        let frame = widget.frame().clone();
        port.post(
            &frame,
            &PreviewMessage::ConsoleLog {
                logs: vec!["1".to_string()],
            },
        );
        assert!(widget.receive().console_updated);

        let update = widget.on_editor_change(ms(10), PaneKind::Html, "<p>b</p>", &Unmeasured);
        assert!(update.remounted && update.console_cleared);
        assert!(widget.console().is_empty());
        assert_eq!(widget.frame().generation(), 1);
        assert!(widget.preview().html.contains("<p>b</p>"));
    }

    #[test]
    fn css_edit_keeps_console() {
        let (mut widget, port) = mount(props("<p>a</p>", "console.log(1)"));
        port.post(
            widget.frame(),
            &PreviewMessage::ConsoleLog {
                logs: vec!["1".to_string()],
            },
        );
        widget.receive();
        let update = widget.on_editor_change(ms(10), PaneKind::Css, "p{}", &Unmeasured);
        assert!(update.remounted);
        assert!(!update.console_cleared);
        assert_eq!(widget.console(), ["1"]);
    }

    #[test]
    fn unchanged_edit_is_a_no_op() {
        let (mut widget, _port) = mount(props("<p>a</p>", ""));
        let update = widget.on_editor_change(ms(10), PaneKind::Html, "<p>a</p>\n", &Unmeasured);
        assert!(!update.remounted);
        assert_eq!(widget.frame().generation(), 0);
    }

    #[test]
    fn superseded_frame_messages_are_dropped() {
        let (mut widget, port) = mount(props("<p>a</p>", "console.log(1)"));
        let stale = widget.frame().clone();
        widget.on_editor_change(ms(1), PaneKind::Js, "console.log(2)", &Unmeasured);

        let mut relay = ConsoleRelay::default();
        port.post(&stale, &relay.log(&[json!(1)]));
        port.post(&stale, &PreviewMessage::HeightChange { height: 900.0 });
        port.post_raw(widget.frame(), r#"{"type":"somethingElse"}"#);

        let update = widget.receive();
        assert!(!update.console_updated && !update.preview_height_changed);
        assert!(widget.console().is_empty());
        assert_eq!(widget.preview_height(), 200.0);
    }

    #[test]
    fn height_requests_to_detached_frames_are_swallowed() {
        let (mut widget, port) = mount(props("<p>a</p>", ""));
        assert!(widget.request_height());
        assert_eq!(
            port.take_requests(),
            vec![(widget.frame().clone(), HostMessage::HeightRequest)]
        );
        port.detach(widget.frame());
        assert!(!widget.request_height());
    }

    #[test]
    fn load_of_superseded_frame_is_ignored() {
        let (mut widget, port) = mount(props("<p>a</p>", ""));
        let stale = widget.frame().clone();
        widget.on_editor_change(ms(1), PaneKind::Html, "<p>b</p>", &Unmeasured);
        assert!(!widget.frame_loaded(ms(2), &stale, Some(800.0)).preview_height_changed);
        assert!(port.take_requests().is_empty());

        let current = widget.frame().clone();
        assert!(widget.frame_loaded(ms(3), &current, Some(800.0)).preview_height_changed);
        assert_eq!(widget.preview_height(), 800.0);
        assert_eq!(port.take_requests().len(), 1);
    }

    #[test]
    fn min_height_prop_moves_the_baseline() {
        let (mut widget, _port) = mount(WidgetProps {
            min_height: Some(MinHeightSetting::from("320px")),
            ..props("<p>a</p>", "")
        });
        assert_eq!(widget.preview_height(), 320.0);

        let next = WidgetProps {
            min_height: Some(MinHeightSetting::from("tall")),
            ..widget.props().clone()
        };
        assert!(widget.set_props(ms(5), next, &Unmeasured).preview_height_changed);
        assert_eq!(widget.preview_height(), 200.0);
    }

    #[test]
    fn editor_bindings_follow_visibility_and_theme() {
        let (widget, _port) = mount(WidgetProps {
            theme: Theme::Dark,
            ..props("<p>a</p>", "let x = 1;")
        });
        assert_eq!(
            widget.editor_binding(PaneKind::Js),
            Some(EditorBinding {
                pane: PaneKind::Js,
                language_id: "javascript",
                value: "let x = 1;\n",
                theme: Theme::Dark,
            })
        );
        assert_eq!(widget.editor_binding(PaneKind::Css), None);
    }

    #[test]
    fn new_prop_value_becomes_reset_baseline() {
        let (mut widget, _port) = mount(props("<p>a</p>", ""));
        widget.on_editor_change(ms(1), PaneKind::Html, "<p>edited</p>", &Unmeasured);
        widget.set_props(ms(2), props("<p>b</p>", ""), &Unmeasured);
        assert_eq!(widget.document().html, "<p>b</p>\n");
        widget.on_editor_change(ms(3), PaneKind::Html, "<p>edited</p>", &Unmeasured);
        widget.reset(ms(4), &Unmeasured);
        assert_eq!(widget.document().html, "<p>b</p>\n");
    }

    #[test]
    fn unmount_mid_drag_restores_global_style() {
        let (mut widget, _port) = mount(WidgetProps {
            css: Some("p{}".to_string()),
            ..props("<p>a</p>", "")
        });
        widget.window_resized(ms(1), Some(800.0), &Unmeasured);
        widget
            .layout_mut()
            .pointer_down(DividerId::new(PaneKind::Html, PaneKind::Css), 1, 400.0);
        let dispatch = widget.unmount().expect("drag was live");
        assert_eq!(dispatch.style_command, Some(GlobalStyleCommand::Restore));
        assert!(!widget.layout().is_resizing());
    }

    #[test]
    fn editor_height_settles_after_change() {
        let (mut widget, _port) = mount(props("<p>a</p>", ""));
        widget.tick(ms(50), &Unmeasured, || None);
        widget.on_editor_change(ms(100), PaneKind::Html, "a\nb\nc\nd\ne\nf", &Unmeasured);
        assert_eq!(widget.tick(ms(120), &Unmeasured, || None).editor_height, None);
        // 6 lines * 20 + 16.
        assert_eq!(
            widget.tick(ms(150), &Unmeasured, || None).editor_height,
            Some(136.0)
        );
    }
}
