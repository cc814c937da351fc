//! Platform slug → local folder resolution
//!
//! Resolution order, first match wins:
//! 1. operator override map (any device profile)
//! 2. the device profile's built-in table (muOS, SpruceOS)
//! 3. the EmulationStation table, for devices without their own table
//! 4. the lower-cased slug itself
//!
//! Slugs compare case-insensitively; folder names keep the casing of the
//! table they came from.

mod tables;

use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use tables::{ES_FOLDERS, MUOS_FOLDERS, SPRUCEOS_FOLDERS};

/// Present on muOS installs.
const MUOS_MARKER: &str = "/mnt/mmc/MUOS";

/// Target device family, which decides the folder convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    /// muOS: fixed platform table, two SD card volumes
    #[serde(rename = "muos")]
    MuOs,
    /// SpruceOS: fixed platform table
    #[serde(rename = "spruceos")]
    SpruceOs,
    /// Anything else: folders are discovered on disk
    Generic,
}

impl DeviceProfile {
    /// Detect the running device.
    pub fn detect() -> Self {
        if Path::new(MUOS_MARKER).exists() {
            DeviceProfile::MuOs
        } else {
            DeviceProfile::Generic
        }
    }

    /// Whether the device ships a fixed platform table.
    ///
    /// Fixed-catalog devices trust the table to decide which platforms are
    /// usable; open-catalog devices trust the folders present on disk.
    pub fn has_fixed_catalog(self) -> bool {
        self.builtin_table().is_some()
    }

    fn builtin_table(self) -> Option<&'static [(&'static str, &'static str)]> {
        match self {
            DeviceProfile::MuOs => Some(MUOS_FOLDERS),
            DeviceProfile::SpruceOs => Some(SPRUCEOS_FOLDERS),
            DeviceProfile::Generic => None,
        }
    }
}

fn lookup<'t>(table: &'t [(&'static str, &'static str)], slug: &str) -> Option<&'t str> {
    table.iter().find(|(key, _)| *key == slug).map(|(_, folder)| *folder)
}

fn lookup_es(slug: &str) -> Option<(&'static str, &'static str)> {
    ES_FOLDERS
        .iter()
        .find(|(key, _, _)| *key == slug)
        .map(|(_, folder, icon)| (*folder, *icon))
}

/// Maps server platform slugs to local folder names for one device profile.
#[derive(Debug, Clone)]
pub struct FolderResolver {
    profile: DeviceProfile,
    /// Keyed by lower-cased slug.
    overrides: HashMap<String, String>,
}

impl FolderResolver {
    pub fn new<I>(profile: DeviceProfile, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides = overrides
            .into_iter()
            .map(|(slug, folder)| (slug.to_lowercase(), folder))
            .collect();
        Self { profile, overrides }
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    /// Local folder name for a platform slug.
    pub fn resolve(&self, slug: &str) -> String {
        let slug = slug.to_lowercase();

        if let Some(folder) = self.overrides.get(&slug) {
            return folder.clone();
        }

        let builtin = match self.profile.builtin_table() {
            Some(table) => lookup(table, &slug),
            None => lookup_es(&slug).map(|(folder, _)| folder),
        };
        builtin.map(str::to_string).unwrap_or(slug)
    }

    /// Whether a fixed-catalog device supports this slug, either through its
    /// built-in table or through the override map.
    ///
    /// Always `false` on open-catalog devices, which have no table to consult.
    pub fn is_supported(&self, slug: &str) -> bool {
        let slug = slug.to_lowercase();
        match self.profile.builtin_table() {
            Some(table) => lookup(table, &slug).is_some() || self.overrides.contains_key(&slug),
            None => false,
        }
    }

    /// Icon asset name on the server for a platform slug.
    pub fn icon_name(&self, slug: &str) -> String {
        lookup_es(&slug.to_lowercase())
            .map(|(_, icon)| icon.to_string())
            .unwrap_or_else(|| slug.to_string())
    }
}
