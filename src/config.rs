//! Conditioner configuration
//!
//! A single TOML file describing which device to open and how to condition
//! it. A missing file is not an error: defaults are used and a warning is
//! logged, so the tool still starts on a fresh machine.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::controller::{DeadbandSettings, PollSettings};

const CONFIG_DIR: &str = "joystick-conditioner";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ConditionerConfig {
    /// Position of the gamepad among connected devices
    pub device_index: usize,
    pub deadband_x: f64,
    pub deadband_y: f64,
    pub poll_interval_ms: u64,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            deadband_x: 0.0,
            deadband_y: 0.0,
            poll_interval_ms: 20,
        }
    }
}

impl ConditionerConfig {
    /// `<config dir>/joystick-conditioner/config.toml`, falling back to the working directory
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    pub fn deadbands(&self) -> DeadbandSettings {
        DeadbandSettings::new(self.deadband_x, self.deadband_y)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.deadbands()
            .validate()
            .map_err(|e| eyre!("Invalid configuration: {}", e))?;
        if self.poll_interval_ms == 0 {
            return Err(eyre!("Invalid configuration: poll_interval_ms must be > 0"));
        }
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
        config.validate()?;

        info!("Loaded configuration from {}", path.display());
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            Self::load(path).await
        } else {
            warn!(
                "Config file {} does not exist, using default",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize configuration: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ConditionerConfig = toml::from_str("deadband_y = 0.1\n").unwrap();
        assert_eq!(config.deadband_y, 0.1);
        assert_eq!(config.device_index, 0);
        assert_eq!(config.poll_interval_ms, 20);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConditionerConfig {
            deadband_x: 1.0,
            ..ConditionerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ConditionerConfig {
            poll_interval_ms: 0,
            ..ConditionerConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(ConditionerConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        // nested so save has to create the parent directory
        let path = temp_dir.path().join(CONFIG_DIR).join(CONFIG_FILE);
        let config = ConditionerConfig {
            device_index: 1,
            deadband_x: 0.05,
            deadband_y: 0.1,
            poll_interval_ms: 10,
        };

        config.save(&path).await.unwrap();
        let loaded = ConditionerConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_uses_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        let config = ConditionerConfig::load_or_default(&path).await.unwrap();
        assert_eq!(config, ConditionerConfig::default());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_deadband() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "deadband_x = 1.5\n").await.unwrap();

        assert!(ConditionerConfig::load(&path).await.is_err());
    }
}
