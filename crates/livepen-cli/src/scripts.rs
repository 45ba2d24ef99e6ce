//! `livepen scripts`: print the in-frame instrumentation scripts.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use livepen::{WidgetConfig, console_relay_script, height_observer_script};

use crate::error::Result;
use crate::util::emit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptKind {
    Console,
    Height,
    All,
}

#[derive(Debug, Clone, Args)]
pub struct ScriptsArgs {
    #[arg(long, value_enum, default_value_t = ScriptKind::All)]
    pub kind: ScriptKind,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[must_use]
pub fn render_scripts(kind: ScriptKind, config: &WidgetConfig) -> String {
    match kind {
        ScriptKind::Console => console_relay_script(&config.console),
        ScriptKind::Height => height_observer_script().to_string(),
        ScriptKind::All => format!(
            "// console relay\n{}\n\n// height observer\n{}",
            console_relay_script(&config.console),
            height_observer_script()
        ),
    }
}

pub fn run_scripts(args: ScriptsArgs, config: &WidgetConfig) -> Result<()> {
    emit(args.output.as_deref(), &render_scripts(args.kind, config))
}
