//! Configuration and settings management for LaserSketch
//!
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (port, baud rate, read timeout)
//! - Machine preferences (jog defaults, position polling)
//! - Designer preferences (history depth, grid)

use lasersketch_core::CoordinateMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Config file name inside the application config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Smallest grid spacing the designer will draw
pub const MIN_GRID_SPACING: f64 = 1.0;

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port name; empty means run without a machine
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Serial read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Hardware flow control
    pub flow_control: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115200,
            read_timeout_ms: 50,
            flow_control: false,
        }
    }
}

/// Machine preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Default jog step in machine units
    pub step_size: f64,
    /// Default jog feed rate in units/min
    pub feed_rate: u32,
    /// Coordinate mode used for jogs
    pub mode: CoordinateMode,
    /// Interval between position queries in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            step_size: lasersketch_core::data::DEFAULT_STEP_SIZE,
            feed_rate: lasersketch_core::data::DEFAULT_FEED_RATE,
            mode: CoordinateMode::Absolute,
            poll_interval_ms: 200,
        }
    }
}

/// Designer preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerSettings {
    /// Number of undo snapshots kept
    pub history_depth: usize,
    /// Grid spacing in canvas units
    pub grid_spacing: f64,
    /// Show the grid on startup
    pub show_grid: bool,
}

impl Default for DesignerSettings {
    fn default() -> Self {
        Self {
            history_depth: 50,
            grid_spacing: 10.0,
            show_grid: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Machine preferences
    pub machine: MachineSettings,
    /// Designer preferences
    pub designer: DesignerSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path`, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.connection.baud_rate == 0 {
            return Err(SettingsError::invalid("connection.baud_rate", "must be > 0"));
        }

        if self.connection.read_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "connection.read_timeout_ms",
                "must be > 0",
            ));
        }

        if !self.machine.step_size.is_finite() || self.machine.step_size <= 0.0 {
            return Err(SettingsError::invalid("machine.step_size", "must be > 0"));
        }

        if self.machine.feed_rate == 0 {
            return Err(SettingsError::invalid("machine.feed_rate", "must be > 0"));
        }

        if self.machine.poll_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "machine.poll_interval_ms",
                "must be > 0",
            ));
        }

        if self.designer.history_depth == 0 {
            return Err(SettingsError::invalid(
                "designer.history_depth",
                "must be > 0",
            ));
        }

        let spacing = self.designer.grid_spacing;
        if !spacing.is_finite() || spacing < MIN_GRID_SPACING {
            return Err(SettingsError::invalid(
                "designer.grid_spacing",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Platform config location, e.g. `~/.config/lasersketch/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| {
        SettingsError::ConfigDirectory("no config directory for this platform".to_string())
    })?;
    Ok(dir.join("lasersketch").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.machine.poll_interval_ms, 200);
        assert_eq!(config.designer.history_depth, 50);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut config = Config::new();
        config.machine.feed_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "machine.feed_rate"
        ));

        let mut config = Config::new();
        config.machine.step_size = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.connection.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_tiny_grid_spacing() {
        let mut config = Config::new();
        config.designer.grid_spacing = 1e-6;
        config.designer.show_grid = true;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "designer.grid_spacing"
        ));

        config.designer.grid_spacing = MIN_GRID_SPACING;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            port = "/dev/ttyUSB0"

            [machine]
            mode = "relative"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.port, "/dev/ttyUSB0");
        assert_eq!(config.connection.baud_rate, 115200);
        assert_eq!(config.machine.mode, CoordinateMode::Relative);
        assert_eq!(config.machine.feed_rate, 1000);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::new()
            .save_to_file(Path::new("settings.yaml"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(ref ext) if ext == "yaml"));
    }
}
