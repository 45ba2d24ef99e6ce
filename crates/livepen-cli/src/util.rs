use std::fs;
use std::path::Path;

use livepen::WidgetConfig;

use crate::error::{CliError, Result};

pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::MissingPath {
            path: path.to_path_buf(),
        })
    }
}

pub fn read_string(path: &Path) -> Result<String> {
    ensure_exists(path)?;
    Ok(fs::read_to_string(path)?)
}

pub fn write_string(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Write to `output`, or to stdout when no file is given.
pub fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            write_string(path, content)?;
            tracing::info!(path = %path.display(), bytes = content.len(), "wrote output");
            Ok(())
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

/// Load a widget configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<WidgetConfig> {
    let Some(path) = path else {
        return Ok(WidgetConfig::default());
    };
    let raw = read_string(path)?;
    toml::from_str(&raw).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::{emit, load_config, read_string};
    use crate::error::CliError;

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.layout.min_panel_width, 120.0);
    }

    #[test]
    fn partial_toml_config_is_merged_with_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("livepen.toml");
        std::fs::write(
            &path,
            "reset_settle_delay = 250\n\n[layout]\nmin_panel_width = 80\n\n[console]\nstring_budget = 10\n",
        )
        .expect("write config");

        let config = load_config(Some(&path)).expect("config");
        assert_eq!(config.layout.min_panel_width, 80.0);
        assert_eq!(config.layout.keyboard_step_percent, 5.0);
        assert_eq!(config.console.string_budget, 10);
        assert_eq!(config.reset_settle_delay, Duration::from_millis(250));
    }

    #[test]
    fn malformed_config_reports_its_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[layout\n").expect("write config");
        let error = load_config(Some(&path)).expect_err("broken config");
        assert!(matches!(error, CliError::Config { .. }));
        assert!(error.to_string().contains("broken.toml"));
    }

    #[test]
    fn emit_creates_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out/nested/preview.html");
        emit(Some(&path), "<p>hi</p>").expect("emit");
        assert_eq!(read_string(&path).expect("read back"), "<p>hi</p>");
    }
}
