//! `livepen fit`: print the auto-fit split for a set of desired widths.

use std::path::PathBuf;

use clap::Args;
use livepen::{PaneKind, WidgetConfig, auto_fit};
use serde::Serialize;

use crate::error::{CliError, Result};
use crate::util::emit;

#[derive(Debug, Clone, Args)]
pub struct FitArgs {
    /// Container width in pixels. Omit for an unmeasured container.
    #[arg(long)]
    pub container: Option<f64>,

    /// Desired panel widths in pixels, HTML first (at most three).
    #[arg(long, value_delimiter = ',', required = true)]
    pub desired: Vec<f64>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitReport {
    pub container: Option<f64>,
    pub min_panel_width: f64,
    pub widths: Vec<PanelShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelShare {
    pub panel: PaneKind,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<f64>,
}

pub fn fit_report(args: &FitArgs, config: &WidgetConfig) -> Result<FitReport> {
    if args.desired.is_empty() || args.desired.len() > PaneKind::ALL.len() {
        return Err(CliError::invalid(format!(
            "--desired takes 1 to {} widths, got {}",
            PaneKind::ALL.len(),
            args.desired.len()
        )));
    }
    if let Some(bad) = args.desired.iter().find(|px| !px.is_finite() || **px < 0.0) {
        return Err(CliError::invalid(format!("desired width {bad} is not usable")));
    }

    let desired: Vec<(PaneKind, f64)> = PaneKind::ALL
        .into_iter()
        .zip(args.desired.iter().copied())
        .collect();
    let min_panel_width = config.layout.min_panel_width;
    let widths = auto_fit(&desired, args.container, min_panel_width);
    let container = args.container.filter(|px| px.is_finite() && *px > 0.0);
    Ok(FitReport {
        container,
        min_panel_width,
        widths: widths
            .iter()
            .map(|(panel, percent)| PanelShare {
                panel,
                percent,
                pixels: container.map(|px| percent / 100.0 * px),
            })
            .collect(),
    })
}

pub fn run_fit(args: FitArgs, config: &WidgetConfig) -> Result<()> {
    let report = fit_report(&args, config)?;
    emit(args.output.as_deref(), &serde_json::to_string_pretty(&report)?)
}
