//! LaserSketch Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, ConnectionSettings, DesignerSettings, MachineSettings,
};
pub use error::{SettingsError, SettingsResult};
