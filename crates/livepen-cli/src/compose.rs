//! `livepen compose`: build a preview document from files on disk.
//!
//! Virtual paths are the file paths relative to `--dir`, so a page that links
//! `css/site.css` picks up `--css css/site.css` the same way the widget does.

use std::path::PathBuf;

use clap::Args;
use livepen::{FrameId, ImageMap, PaneVisibility, PreviewComposer, SourceDocument, WidgetConfig};

use crate::error::{CliError, Result};
use crate::util::{emit, read_string};

#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// Project directory the virtual paths are relative to.
    #[arg(long)]
    pub dir: PathBuf,

    #[arg(long, default_value = "index.html")]
    pub html: String,

    #[arg(long)]
    pub css: Option<String>,

    #[arg(long)]
    pub js: Option<String>,

    /// JSON object mapping virtual image paths to URLs.
    #[arg(long)]
    pub images: Option<PathBuf>,

    #[arg(long = "frame-id", default_value = "livepen-preview")]
    pub frame_id: String,

    /// Leave out the console relay script.
    #[arg(long = "no-console")]
    pub no_console: bool,

    /// Leave out the height observer script.
    #[arg(long = "no-preview-observer")]
    pub no_preview_observer: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn read_relative(args: &ComposeArgs, rel: Option<&str>) -> Result<String> {
    rel.map_or_else(|| Ok(String::new()), |rel| read_string(&args.dir.join(rel)))
}

fn load_document(args: &ComposeArgs) -> Result<SourceDocument> {
    let html = read_relative(args, Some(&args.html))?;
    let css = read_relative(args, args.css.as_deref())?;
    let js = read_relative(args, args.js.as_deref())?;

    let mut doc = SourceDocument::new(&html, &css, &js);
    doc.html_path = Some(args.html.clone());
    doc.css_path.clone_from(&args.css);
    doc.js_path.clone_from(&args.js);
    if let Some(images) = &args.images {
        let raw = read_string(images)?;
        let map: ImageMap = serde_json::from_str(&raw)?;
        doc.images = Some(map);
    }
    Ok(doc)
}

pub fn run_compose(args: ComposeArgs, config: &WidgetConfig) -> Result<()> {
    if args.frame_id.trim().is_empty() {
        return Err(CliError::invalid("--frame-id must not be empty"));
    }
    let doc = load_document(&args)?;

    let mut visibility = PaneVisibility::default().resolve(&doc);
    visibility.console &= !args.no_console;
    visibility.preview &= !args.no_preview_observer;

    let preview = PreviewComposer::new(config.console).compose(
        &doc,
        &visibility,
        &FrameId::new(args.frame_id.as_str()),
    );
    tracing::info!(
        css_injected = preview.css_injected,
        js_injected = preview.js_injected,
        js_appended = preview.js_appended,
        console_relay = preview.console_relay,
        height_observer = preview.height_observer,
        "composed preview"
    );
    emit(args.output.as_deref(), &preview.html)
}
