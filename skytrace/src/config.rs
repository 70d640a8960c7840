//! Configuration file handling for `~/.skytrace/config.ini`.
//!
//! Holds the source-selection policy (phone vs bluetooth positioning) and
//! the barometric altimeter enable flag. Missing files and missing keys
//! fall back to defaults; an unparsable value is an error rather than a
//! silent guess.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::location::LocationMode;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(std::io::Error),

    #[error("Invalid configuration: {section}.{key} = '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// User settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Which positioning path supplies ground-truth position.
    pub location_mode: LocationMode,
    /// Whether the onboard barometric sensor feeds the fusion engine.
    pub altimeter_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location_mode: LocationMode::Phone,
            altimeter_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from the default path (`~/.skytrace/config.ini`).
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        let mut settings = Self::default();

        if let Some(value) = ini.get_from(Some("location"), "source") {
            settings.location_mode = match value {
                "phone" => LocationMode::Phone,
                "bluetooth" => LocationMode::Bluetooth,
                other => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "location".into(),
                        key: "source".into(),
                        value: other.into(),
                    })
                }
            };
        }
        if let Some(value) = ini.get_from(Some("altimeter"), "enabled") {
            settings.altimeter_enabled = match value {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "altimeter".into(),
                        key: "enabled".into(),
                        value: other.into(),
                    })
                }
            };
        }
        Ok(settings)
    }

    /// Save settings to an explicit path, creating the directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }
        let mut ini = Ini::new();
        ini.with_section(Some("location")).set(
            "source",
            match self.location_mode {
                LocationMode::Phone => "phone",
                LocationMode::Bluetooth => "bluetooth",
            },
        );
        ini.with_section(Some("altimeter"))
            .set("enabled", if self.altimeter_enabled { "true" } else { "false" });
        ini.write_to_file(path).map_err(ConfigFileError::WriteError)
    }
}

/// Default config file location.
fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".skytrace")
        .join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/config.ini")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let settings = Settings {
            location_mode: LocationMode::Bluetooth,
            altimeter_enabled: false,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_source_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[location]\nsource=carrier-pigeon\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }
}
