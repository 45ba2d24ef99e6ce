use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::compose::{ComposeArgs, run_compose};
use crate::error::Result;
use crate::fit::{FitArgs, run_fit};
use crate::scripts::{ScriptsArgs, run_scripts};
use crate::util::load_config;

#[derive(Debug, Parser)]
#[command(
    name = "livepen",
    about = "Compose sandboxed live previews and inspect livepen layouts",
    version
)]
pub struct Cli {
    /// Widget configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report failures as a JSON status line on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose a preview document from HTML/CSS/JS files.
    Compose(ComposeArgs),

    /// Print the auto-fit panel split for desired widths.
    Fit(FitArgs),

    /// Print the in-frame instrumentation scripts.
    Scripts(ScriptsArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Compose(args) => run_compose(args, &config),
        Commands::Fit(args) => run_fit(args, &config),
        Commands::Scripts(args) => run_scripts(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::compose::ComposeArgs;
    use crate::error::CliError;
    use crate::fit::FitArgs;
    use crate::scripts::{ScriptKind, ScriptsArgs};

    use super::{Cli, Commands, run};

    fn compose_args(dir: PathBuf, output: PathBuf) -> ComposeArgs {
        ComposeArgs {
            dir,
            html: "index.html".to_string(),
            css: None,
            js: None,
            images: None,
            frame_id: "livepen-preview".to_string(),
            no_console: false,
            no_preview_observer: false,
            output: Some(output),
        }
    }

    #[test]
    fn compose_inlines_linked_stylesheet() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("index.html"),
            "<link rel=\"stylesheet\" href=\"style.css\">\n<p>hi</p>\n",
        )
        .expect("write html");
        fs::write(dir.path().join("style.css"), "body{color:red}\n").expect("write css");
        let output = dir.path().join("out/preview.html");

        let result = run(Cli {
            config: None,
            json: false,
            command: Commands::Compose(ComposeArgs {
                css: Some("style.css".to_string()),
                ..compose_args(dir.path().to_path_buf(), output.clone())
            }),
        });
        assert!(result.is_ok());

        let html = fs::read_to_string(output).expect("composed output");
        assert!(html.contains("<style data-from-file=\"style.css\">\nbody{color:red}\n</style>"));
        assert!(!html.contains("<link"));
        assert!(html.contains("<meta name=\"livepen-frame\" content=\"livepen-preview#0\">"));
    }

    #[test]
    fn compose_resolves_images_from_a_map_file() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("pages")).expect("pages dir");
        fs::write(dir.path().join("pages/index.html"), "<img src=\"../img/logo.png\">")
            .expect("write html");
        fs::write(
            dir.path().join("images.json"),
            r#"{"img/logo.png": "https://cdn.example/logo.png"}"#,
        )
        .expect("write images");
        let output = dir.path().join("preview.html");

        let result = run(Cli {
            config: None,
            json: false,
            command: Commands::Compose(ComposeArgs {
                html: "pages/index.html".to_string(),
                images: Some(dir.path().join("images.json")),
                no_console: true,
                no_preview_observer: true,
                ..compose_args(dir.path().to_path_buf(), output.clone())
            }),
        });
        assert!(result.is_ok());

        let html = fs::read_to_string(output).expect("composed output");
        assert!(html.contains("<img src=\"https:&#x2f;&#x2f;cdn.example&#x2f;logo.png\">"));
        assert!(!html.contains("data-livepen-instrumentation"));
    }

    #[test]
    fn compose_reports_missing_markup() {
        let dir = tempdir().expect("tempdir");
        let result = run(Cli {
            config: None,
            json: false,
            command: Commands::Compose(compose_args(
                dir.path().to_path_buf(),
                dir.path().join("preview.html"),
            )),
        });
        let error = result.expect_err("missing index.html");
        assert!(matches!(error, CliError::MissingPath { .. }));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn fit_writes_percentages() {
        let dir = tempdir().expect("tempdir");
        let output = dir.path().join("fit.json");
        let result = run(Cli {
            config: None,
            json: false,
            command: Commands::Fit(FitArgs {
                container: Some(1000.0),
                desired: vec![500.0, 250.0, 250.0],
                output: Some(output.clone()),
            }),
        });
        assert!(result.is_ok());

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).expect("fit output")).expect("json");
        assert_eq!(report["minPanelWidth"], 120.0);
        assert_eq!(report["widths"][0]["panel"], "html");
        assert_eq!(report["widths"][0]["percent"], 50.0);
        assert_eq!(report["widths"][2]["pixels"], 250.0);
    }

    #[test]
    fn fit_rejects_too_many_panels() {
        let result = run(Cli {
            config: None,
            json: false,
            command: Commands::Fit(FitArgs {
                container: None,
                desired: vec![1.0, 2.0, 3.0, 4.0],
                output: None,
            }),
        });
        let error = result.expect_err("four panels");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn scripts_honour_configured_budgets() {
        let dir = tempdir().expect("tempdir");
        let config = dir.path().join("livepen.toml");
        fs::write(&config, "[console]\nstring_budget = 42\n").expect("write config");
        let output = dir.path().join("console.js");

        let result = run(Cli {
            config: Some(config),
            json: false,
            command: Commands::Scripts(ScriptsArgs {
                kind: ScriptKind::Console,
                output: Some(output.clone()),
            }),
        });
        assert!(result.is_ok());

        let script = fs::read_to_string(output).expect("script output");
        assert!(script.contains("42"));
        assert!(script.contains("consoleLog"));
        assert!(!script.contains("heightChange"));
    }
}
