use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zonecraft_engine::constraints::ZoneConfig;
use zonecraft_engine::io::JsonFileStore;
use zonecraft_engine::validation::{DEFAULT_LARGE_ZONE_THRESHOLD, ValidationOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read zone constraints at {zones_path}: {source}")]
    ZonesReadError {
        zones_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse zone constraints at {zones_path}: {source}")]
    ZonesParseError {
        zones_path: PathBuf,
        source: serde_json::Error,
    },
}

fn default_autosave_interval_secs() -> u64 {
    30
}

fn default_large_zone_threshold() -> usize {
    DEFAULT_LARGE_ZONE_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one JSON file per page
    pub pages_path: PathBuf,
    /// JSON zone constraint config supplied by the theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones_path: Option<PathBuf>,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default = "default_large_zone_threshold")]
    pub large_zone_threshold: usize,
}

impl Config {
    pub fn new(pages_path: impl Into<PathBuf>) -> Self {
        Self {
            pages_path: pages_path.into(),
            zones_path: None,
            autosave_interval_secs: default_autosave_interval_secs(),
            large_zone_threshold: default_large_zone_threshold(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.pages_path = Self::expand_path(&config.pages_path).unwrap_or(config.pages_path);
        config.zones_path = config
            .zones_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/zonecraft");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            large_zone_threshold: self.large_zone_threshold,
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    /// Zone constraints for new sessions. No `zones_path` means no
    /// constraints; a configured path that cannot be read is an error.
    pub fn load_zone_config(&self) -> Result<ZoneConfig, ConfigError> {
        let Some(zones_path) = &self.zones_path else {
            log::debug!("No zones_path configured, using empty zone config");
            return Ok(ZoneConfig::default());
        };

        let content =
            std::fs::read_to_string(zones_path).map_err(|source| ConfigError::ZonesReadError {
                zones_path: zones_path.clone(),
                source,
            })?;
        let zone_config: ZoneConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::ZonesParseError {
                zones_path: zones_path.clone(),
                source,
            })?;

        log::info!(
            "Loaded {} zone definitions from {}",
            zone_config.zones.len(),
            zones_path.display()
        );
        Ok(zone_config)
    }

    pub fn page_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.pages_path)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
