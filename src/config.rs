//! Configuration system for the Area window core
//!
//! Loads configuration from TOML file at `~/.config/area/desktop.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub decoration: DecorationConfig,
    pub input: InputConfig,
    pub group: GroupConfig,
    pub misc: MiscConfig,
    pub resize: ResizeConfig,
    pub animations: AnimationConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("desktop.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }

    /// Look up a value by its `section:key` name.
    ///
    /// Window properties that fall back to a global setting name it this
    /// way (`"general:border_size"`), so the lookup table is the one place
    /// that knows how names map onto the typed sections.
    pub fn value(&self, key: &str) -> Option<ConfigValue> {
        let value = match key {
            "general:border_size" => ConfigValue::Int(self.general.border_size),
            "general:gaps_in" => ConfigValue::Int(self.general.gaps_in),
            "decoration:rounding" => ConfigValue::Int(self.decoration.rounding),
            "decoration:rounding_power" => ConfigValue::Float(self.decoration.rounding_power),
            "input:scroll_factor" => ConfigValue::Float(self.input.scroll_factor),
            "input:touchpad:scroll_factor" => ConfigValue::Float(self.input.touchpad.scroll_factor),
            "misc:focus_on_activate" => ConfigValue::Bool(self.misc.focus_on_activate),
            _ => return None,
        };
        Some(value)
    }
}

/// A config value as seen through its string key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ConfigValue {
    pub fn as_int(self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(v),
            ConfigValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

/// General layout-facing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Border width in pixels
    pub border_size: i64,
    /// Gaps between tiled windows in pixels
    pub gaps_in: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            border_size: 2,
            gaps_in: 5,
        }
    }
}

/// Decoration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Corner rounding radius in pixels
    pub rounding: i64,
    /// Rounding curve exponent (2.0 = circle)
    pub rounding_power: f64,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            rounding: 8,
            rounding_power: 2.0,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Mouse wheel scroll multiplier
    pub scroll_factor: f64,
    pub touchpad: TouchpadConfig,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            scroll_factor: 1.0,
            touchpad: TouchpadConfig::default(),
        }
    }
}

/// Touchpad configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchpadConfig {
    /// Touchpad scroll multiplier
    pub scroll_factor: f64,
}

impl Default for TouchpadConfig {
    fn default() -> Self {
        Self { scroll_factor: 1.0 }
    }
}

/// Tabbed group behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// New windows join the focused window's group
    pub auto_group: bool,
    /// Insert new members after the current member instead of after the tail
    pub insert_after_current: bool,
    /// Focus the member that takes over when the current one is removed
    pub focus_removed_window: bool,
    /// Height of the tab bar drawn above grouped windows
    pub bar_height: i64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            auto_group: true,
            insert_after_current: true,
            focus_removed_window: true,
            bar_height: 20,
        }
    }
}

/// Miscellaneous behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscConfig {
    /// Activation requests from clients move focus instead of only marking urgency
    pub focus_on_activate: bool,
    /// Place windows on the workspace their launcher was on
    pub initial_workspace_tracking: bool,
    /// Seconds before an unused initial workspace token expires
    pub workspace_token_timeout_secs: u64,
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            focus_on_activate: false,
            initial_workspace_tracking: true,
            workspace_token_timeout_secs: 120,
        }
    }
}

/// Client resize negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Maximum unacknowledged size requests kept per window; the oldest
    /// request is evicted once the cap is reached
    pub max_pending_acks: usize,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self { max_pending_acks: 64 }
    }
}

/// Animation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Enable animations (disabled = every goal is applied immediately)
    pub enabled: bool,
    /// Fade in/out duration in milliseconds
    pub fade_duration_ms: u64,
    /// Window move/resize duration in milliseconds
    pub move_duration_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_duration_ms: 200,
            move_duration_ms: 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            border_size = 4

            [resize]
            max_pending_acks = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.general.border_size, 4);
        assert_eq!(config.general.gaps_in, GeneralConfig::default().gaps_in);
        assert_eq!(config.resize.max_pending_acks, 8);
        assert_eq!(config.decoration, DecorationConfig::default());
    }

    #[test]
    fn test_named_lookup() {
        let mut config = Config::default();
        config.input.touchpad.scroll_factor = 0.5;

        assert_eq!(config.value("general:border_size"), Some(ConfigValue::Int(2)));
        assert_eq!(
            config.value("input:touchpad:scroll_factor").and_then(ConfigValue::as_float),
            Some(0.5)
        );
        assert_eq!(config.value("general:nonexistent"), None);
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("area-desktop-config-{}.toml", std::process::id()));
        fs::write(&path, "[misc]\nfocus_on_activate = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.misc.focus_on_activate);

        let _ = fs::remove_file(&path);
        assert!(Config::load_from(&path).is_err());
    }
}
