//! Host-side settings, persisted as TOML at
//! `~/.config/elementum/settings.toml`. These cover what the operator
//! controls; gameplay balance lives in the game config.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub storage: StorageSettings,
    pub autosave: AutosaveSettings,
    pub logging: LoggingSettings,
    pub game: GameSettings,
}

impl ServerSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("elementum"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Read settings from disk. Any problem falls back to defaults so the
    /// server always comes up.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("No config directory on this platform, running on defaults");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file at {:?} yet, starting with defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Settings loaded from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Settings file is invalid ({}), falling back to defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Settings file unreadable ({}), falling back to defaults", e);
                Self::default()
            }
        }
    }

    /// Write the current settings back to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("no config directory available on this platform");
        };
        fs::create_dir_all(&dir)?;

        let path = dir.join("settings.toml");
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Settings written to {:?}", path);
        Ok(())
    }
}

/// Where player and team records live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Explicit data directory; falls back to the platform data dir
    pub data_dir: Option<PathBuf>,
    /// Rotating backups kept for the player store
    pub max_backups: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_backups: 5,
        }
    }
}

impl StorageSettings {
    /// Resolve the effective data directory
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|p| p.join("elementum"))
            .unwrap_or_else(|| PathBuf::from("elementum-data"))
    }
}

/// Log output control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Gameplay toggles that belong to the host, not the balance config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSettings {
    /// Players who enter creative (free-resource) mode on join
    pub creative_players: Vec<String>,
}

/// Autosave behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveSettings {
    /// Auto-save enabled
    pub enabled: bool,
    /// Auto-save interval in seconds
    pub interval_secs: u32,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300, // 5 minutes
        }
    }
}
