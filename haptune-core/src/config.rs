//! # Configuration Module
//!
//! Start-up defaults for the editor: processing factors, axis settings,
//! vibration settings and log level. Every field is optional in the file.
//!
//! Lookup order for [`AppConfig::load`]:
//! 1. the JSON file named by `HAPTUNE_CONFIG`
//! 2. `haptune.json` in the working directory
//! 3. built-in defaults

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::axes::AxisSettings;
use crate::error::Result;
use crate::vibration::VibrationSettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HAPTUNE_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "haptune.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub smoothing_factor: f64,
    pub interpolation_factor: u32,
    pub downsample_factor: u32,
    pub axes: AxisSettings,
    pub vibration: VibrationSettings,
    pub envelope_visible: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 3.0,
            interpolation_factor: 10,
            downsample_factor: 20,
            axes: AxisSettings::default(),
            vibration: VibrationSettings::default(),
            envelope_visible: true,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration following the lookup order above.
    ///
    /// # Errors
    /// A config file that is named by `HAPTUNE_CONFIG` or exists locally but
    /// cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_with(std::env::var_os(CONFIG_ENV), Path::new("."))
    }

    /// As [`load`](Self::load), with the environment value and working
    /// directory given explicitly.
    ///
    /// # Arguments
    /// * `env_path` - Value of `HAPTUNE_CONFIG`, if set
    /// * `dir` - Directory searched for `haptune.json`
    pub fn load_with(env_path: Option<OsString>, dir: &Path) -> Result<Self> {
        match Self::locate(env_path, dir) {
            Some(path) => Self::load_from(&path),
            None => {
                log::debug!("[CONFIG] No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reads one JSON config file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("[CONFIG] Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The `log` level filter named by `log_level`, falling back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    fn locate(env_path: Option<OsString>, dir: &Path) -> Option<PathBuf> {
        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        let local = dir.join(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }
}
