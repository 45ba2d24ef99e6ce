//! Widget configuration.
//!
//! Every field has a default so partial TOML/JSON documents deserialize.
//! Invalid prop values are never fatal: [`MinHeightSetting::resolve_or`]
//! falls back and emits a warning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console::{DEFAULT_MARKUP_BUDGET, DEFAULT_STRING_BUDGET};

/// Minimum preview height used when no valid value is supplied.
pub const DEFAULT_MIN_HEIGHT_PX: f64 = 200.0;

/// Configuration errors. Callers recover from all of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid minimum height {raw:?}: expected a number or \"<N>px\"")]
    InvalidMinHeight { raw: String },
}

/// Editor color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Minimum height prop: a number of pixels or a `"<N>px"` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinHeightSetting {
    Pixels(f64),
    Text(String),
}

impl MinHeightSetting {
    /// Parse into pixels.
    pub fn parse(&self) -> Result<f64, ConfigError> {
        let value = match self {
            Self::Pixels(px) => Some(*px),
            Self::Text(raw) => raw
                .trim()
                .strip_suffix("px")
                .and_then(|number| number.trim().parse::<f64>().ok()),
        };
        match value {
            Some(px) if px.is_finite() && px >= 0.0 => Ok(px),
            _ => Err(ConfigError::InvalidMinHeight { raw: self.raw() }),
        }
    }

    /// Parse into pixels, falling back to `fallback` with a diagnostic.
    #[must_use]
    pub fn resolve_or(&self, fallback: f64) -> f64 {
        match self.parse() {
            Ok(px) => px,
            Err(error) => {
                tracing::warn!(%error, fallback, "falling back to default minimum height");
                fallback
            }
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Pixels(px) => px.to_string(),
            Self::Text(raw) => raw.clone(),
        }
    }
}

impl From<f64> for MinHeightSetting {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

impl From<&str> for MinHeightSetting {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

/// Split-pane layout tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Smallest width a visible panel may be squeezed to, in pixels.
    pub min_panel_width: f64,
    /// Arrow-key resize step, in percent of the container width.
    pub keyboard_step_percent: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_panel_width: 120.0,
            keyboard_step_percent: 5.0,
        }
    }
}

/// Editor-row height tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorHeightConfig {
    pub min_height: f64,
    pub max_height: f64,
    /// Per-line height used when an editor cannot report its own height.
    pub line_height: f64,
    /// Fixed vertical padding added to line-count estimates.
    pub padding: f64,
    #[serde(with = "millis")]
    pub settle_delay: Duration,
}

impl Default for EditorHeightConfig {
    fn default() -> Self {
        Self {
            min_height: 100.0,
            max_height: 600.0,
            line_height: 20.0,
            padding: 16.0,
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// Preview-frame height tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewHeightConfig {
    pub min_height: f64,
    pub max_height: f64,
    /// Delays after frame load at which the content height is re-checked.
    #[serde(with = "millis_list")]
    pub recheck_delays: Vec<Duration>,
}

impl Default for PreviewHeightConfig {
    fn default() -> Self {
        Self {
            min_height: DEFAULT_MIN_HEIGHT_PX,
            max_height: 2000.0,
            recheck_delays: [50, 150, 400, 1000]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

/// Long-press reset tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPressConfig {
    #[serde(with = "millis")]
    pub duration: Duration,
    #[serde(with = "millis")]
    pub tick_interval: Duration,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(16),
        }
    }
}

/// Console rendering budgets, shared by the relay script and host models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub string_budget: usize,
    pub markup_budget: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            string_budget: DEFAULT_STRING_BUDGET,
            markup_budget: DEFAULT_MARKUP_BUDGET,
        }
    }
}

/// Complete widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub layout: LayoutConfig,
    pub editor_height: EditorHeightConfig,
    pub preview_height: PreviewHeightConfig,
    pub long_press: LongPressConfig,
    pub console: ConsoleConfig,
    /// Delay between a reset and the height recomputation that follows it.
    #[serde(with = "millis")]
    pub reset_settle_delay: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            editor_height: EditorHeightConfig::default(),
            preview_height: PreviewHeightConfig::default(),
            long_press: LongPressConfig::default(),
            console: ConsoleConfig::default(),
            reset_settle_delay: Duration::from_millis(100),
        }
    }
}

impl WidgetConfig {
    /// Apply a minimum-height prop to the preview baseline.
    pub fn apply_min_height(&mut self, setting: Option<&MinHeightSetting>) {
        if let Some(setting) = setting {
            self.preview_height.min_height = setting.resolve_or(DEFAULT_MIN_HEIGHT_PX);
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod millis_list {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            value
                .iter()
                .map(|delay| u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Duration>, D::Error> {
        Vec::<u64>::deserialize(deserializer)
            .map(|list| list.into_iter().map(Duration::from_millis).collect())
    }
}
