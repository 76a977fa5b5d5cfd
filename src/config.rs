// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling

use crate::app::state::DemoMode;
use crate::backends::types::FlashMode;
use crate::constants::{APP_NAME, DEFAULT_SNAPSHOT_QUALITY};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Configuration data that persists between application runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mode the demo starts in
    pub default_mode: DemoMode,
    /// Flash setting passed to photo and recording commands
    pub flash_mode: FlashMode,
    /// JPEG quality for snapshots (0-100)
    pub snapshot_quality: u8,
    /// Skip writing capture metadata into snapshot files
    pub snapshot_skip_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: DemoMode::TakePhoto,
            flash_mode: FlashMode::Off,
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY,
            snapshot_skip_metadata: true,
        }
    }
}

impl Config {
    /// Path of the config file under the user config directory
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.json"))
    }

    /// Load the configuration, falling back to defaults on any failure.
    ///
    /// A missing file is normal (first run); a malformed file is logged
    /// and replaced by defaults rather than aborting startup.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the configuration
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path()
            .ok_or_else(|| AppError::Config("no config directory available".into()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quality_in_range() {
        let config = Config::default();
        assert!(config.snapshot_quality <= 100);
    }

    #[test]
    fn config_json_roundtrip() {
        let config = Config {
            default_mode: DemoMode::CodeScanner,
            flash_mode: FlashMode::Auto,
            snapshot_quality: 50,
            snapshot_skip_metadata: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());
    }
}
