//! Tray configuration.
//!
//! Every field has a default, so an empty or partial TOML file is valid.
//! Paths left unset are resolved against the platform directories.

use crate::error::{Result, TrayError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Identifier the tray registers under; also names the app's directories.
    pub tray_id: String,
    /// Themed icon shown while no icon bytes are set.
    pub fallback_icon_name: String,
    /// Where icon bytes are written for the SNI host to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_cache_dir: Option<PathBuf>,
    /// TOML file backing `get_setting` / `set_setting`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<PathBuf>,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            tray_id: "systray_ksni".to_string(),
            fallback_icon_name: "application-x-executable".to_string(),
            icon_cache_dir: None,
            settings_path: None,
        }
    }
}

impl TrayConfig {
    /// Creates a default configuration for the given tray id.
    pub fn new(tray_id: &str) -> Self {
        Self {
            tray_id: tray_id.to_string(),
            ..Self::default()
        }
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading tray config from {:?}", path);
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| TrayError::Config(format!("{}: {e}", path.display())))
    }

    /// Icon cache directory, defaulting to `<cache dir>/<tray_id>/icons`.
    pub fn icon_cache_dir(&self) -> PathBuf {
        self.icon_cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(&self.tray_id)
                .join("icons")
        })
    }

    /// Settings file, defaulting to `<config dir>/<tray_id>/settings.toml`.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(&self.tray_id)
                .join("settings.toml")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tray.toml");
        fs::write(&path, "tray_id = \"my_app\"\n").unwrap();

        let config = TrayConfig::load(&path).unwrap();
        assert_eq!(config.tray_id, "my_app");
        assert_eq!(config.fallback_icon_name, "application-x-executable");
        assert!(config.settings_path().ends_with("my_app/settings.toml"));
        assert!(config.icon_cache_dir().ends_with("my_app/icons"));
    }

    #[test]
    fn explicit_paths_win() {
        let config = TrayConfig {
            icon_cache_dir: Some(PathBuf::from("/tmp/icons")),
            settings_path: Some(PathBuf::from("/tmp/s.toml")),
            ..TrayConfig::new("x")
        };
        assert_eq!(config.icon_cache_dir(), PathBuf::from("/tmp/icons"));
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/s.toml"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tray.toml");
        fs::write(&path, "tray_id = [").unwrap();
        assert!(matches!(TrayConfig::load(&path), Err(TrayError::Config(_))));
    }
}
