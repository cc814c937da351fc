//! Configuration management (`config.toml` plus environment overlay)
//!
//! Settings are read from `config.toml` in the platform-specific config
//! directory. Environment variables, as set by the device launch script,
//! are applied on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::platforms::DeviceProfile;
use crate::transport::Credentials;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// RomM server connection
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog include/exclude filters
    #[serde(default)]
    pub filters: FilterConfig,
    /// Target device and folder overrides
    #[serde(default)]
    pub device: DeviceConfig,
    /// ROM storage volumes
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://romm.local:8080`
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Platform slugs never shown
    #[serde(default)]
    pub exclude_platforms: Vec<String>,
    /// Collection names to show; when non-empty `exclude_collections` is ignored
    #[serde(default)]
    pub include_collections: Vec<String>,
    /// Collection names to hide
    #[serde(default)]
    pub exclude_collections: Vec<String>,
    /// Virtual collection type requested from the server (default: "collection")
    #[serde(default = "default_collection_type")]
    pub collection_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    /// Device profile; detected at startup when unset
    #[serde(default)]
    pub profile: Option<DeviceProfile>,
    /// Slug → folder overrides, highest priority on every profile
    #[serde(default)]
    pub custom_maps: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// First ROM root (SD1)
    #[serde(default)]
    pub primary: Option<PathBuf>,
    /// Optional second ROM root (SD2)
    #[serde(default)]
    pub secondary: Option<PathBuf>,
    /// Volume used at startup, 1 or 2
    #[serde(default)]
    pub default_volume: Option<u8>,
    /// Where icons and the avatar are cached
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,
}

fn default_collection_type() -> String {
    "collection".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_platforms: Vec::new(),
            include_collections: Vec::new(),
            exclude_collections: Vec::new(),
            collection_type: default_collection_type(),
        }
    }
}

impl SyncConfig {
    /// Basic-auth pair, when both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        if self.server.username.is_empty() || self.server.password.is_empty() {
            return None;
        }
        Some(Credentials {
            username: self.server.username.clone(),
            password: self.server.password.clone(),
        })
    }

    /// Device profile, detecting the running device when not configured.
    pub fn device_profile(&self) -> DeviceProfile {
        self.device.profile.unwrap_or_else(DeviceProfile::detect)
    }

    /// Overlay values from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Overlay values from an environment lookup.
    ///
    /// Lists are comma separated and trimmed. An unparseable `CUSTOM_MAPS`
    /// is logged and leaves the override map empty.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(username) = lookup("USERNAME") {
            self.server.username = username;
        }
        if let Some(password) = lookup("PASSWORD") {
            self.server.password = password;
        }
        if let Some(list) = lookup("EXCLUDE_PLATFORMS") {
            self.filters.exclude_platforms = split_list(&list);
        }
        if let Some(list) = lookup("INCLUDE_COLLECTIONS") {
            self.filters.include_collections = split_list(&list);
        }
        if let Some(list) = lookup("EXCLUDE_COLLECTIONS") {
            self.filters.exclude_collections = split_list(&list);
        }
        if let Some(kind) = lookup("COLLECTION_TYPE") {
            self.filters.collection_type = kind;
        }
        if let Some(raw) = lookup("CUSTOM_MAPS") {
            self.device.custom_maps = match serde_json::from_str(&raw) {
                Ok(maps) => maps,
                Err(e) => {
                    tracing::error!("CUSTOM_MAPS is not a valid JSON object: {}", e);
                    HashMap::new()
                }
            };
        }
        if let Some(profile) = lookup("DEVICE_PROFILE") {
            self.device.profile = parse_profile(&profile);
        }
        if let Some(path) = lookup("ROMS_STORAGE_PATH") {
            self.storage.primary = Some(PathBuf::from(path));
        }
        if let Some(volume) = lookup("DEFAULT_SD_CARD") {
            match volume.trim().parse() {
                Ok(volume) => self.storage.default_volume = Some(volume),
                Err(_) => tracing::warn!("Ignoring DEFAULT_SD_CARD={:?}", volume),
            }
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_profile(value: &str) -> Option<DeviceProfile> {
    match value.trim().to_lowercase().as_str() {
        "muos" => Some(DeviceProfile::MuOs),
        "spruceos" => Some(DeviceProfile::SpruceOs),
        "generic" => Some(DeviceProfile::Generic),
        "" | "auto" => None,
        other => {
            tracing::warn!("Unknown DEVICE_PROFILE '{}', detecting instead", other);
            None
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("app.romm", "", "rommsync")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk, then applies the process environment.
///
/// Falls back to defaults if the file doesn't exist or cannot be parsed.
pub fn load() -> SyncConfig {
    let mut config = config_dir()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.exists())
        .and_then(|path| match load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        })
        .unwrap_or_default();
    config.apply_process_env();
    config
}

/// Reads a config file without applying the environment.
pub fn load_from(path: &Path) -> Result<SyncConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}
