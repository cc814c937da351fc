//! ROM storage volumes and local platform folder discovery

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use hashbrown::HashSet;

use crate::config::StorageConfig;
use crate::model::Title;
use crate::platforms::{DeviceProfile, FolderResolver};

const MUOS_SD1_ROMS: &str = "/mnt/mmc/ROMS";
const MUOS_SD2_ROMS: &str = "/mnt/sdcard/ROMS";

/// Lists the platform folders present under a ROM root, case-folded.
///
/// Returns an empty set if the root does not exist.
pub fn list_local_platform_folders(storage_root: &Path) -> HashSet<String> {
    let Ok(entries) = std::fs::read_dir(storage_root) else {
        return HashSet::new();
    };

    entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            entry
                .path()
                .is_dir()
                .then(|| entry.file_name().to_string_lossy().to_lowercase())
        })
        .collect()
}

/// One or two ROM roots plus the currently active one.
#[derive(Debug)]
pub struct StorageLayout {
    primary: PathBuf,
    secondary: Option<PathBuf>,
    /// 1 or 2
    current: AtomicU8,
    resources: PathBuf,
}

impl StorageLayout {
    /// Explicit layout, mostly for tests and custom setups.
    pub fn new(
        primary: PathBuf,
        secondary: Option<PathBuf>,
        volume: u8,
        resources: PathBuf,
    ) -> Self {
        Self {
            primary,
            secondary,
            current: AtomicU8::new(if volume == 2 { 2 } else { 1 }),
            resources,
        }
    }

    /// Build the layout for a device profile.
    ///
    /// muOS has fixed SD1/SD2 roots. Elsewhere the primary root comes from
    /// config, falling back to two levels above the working directory (the
    /// app is installed under `roms/ports/<app>`). A configured secondary
    /// root is created if missing.
    pub fn from_config(config: &StorageConfig, profile: DeviceProfile) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let (primary, secondary) = match profile {
            DeviceProfile::MuOs => (
                PathBuf::from(MUOS_SD1_ROMS),
                Some(PathBuf::from(MUOS_SD2_ROMS)),
            ),
            _ => (
                config
                    .primary
                    .clone()
                    .unwrap_or_else(|| cwd.join("..").join("..")),
                config.secondary.clone(),
            ),
        };

        if let Some(secondary) = &secondary
            && !secondary.exists()
            && let Err(e) = std::fs::create_dir_all(secondary)
        {
            tracing::warn!("Cannot create secondary storage {}: {}", secondary.display(), e);
        }

        let volume = config
            .default_volume
            .unwrap_or(if primary.exists() { 1 } else { 2 });
        let resources = config
            .resources_dir
            .clone()
            .unwrap_or_else(|| cwd.join("resources"));

        Self::new(primary, secondary, volume, resources)
    }

    /// Active volume number, 1 or 2.
    pub fn current_volume(&self) -> u8 {
        self.current.load(Ordering::Acquire)
    }

    /// Toggle between volume 1 and 2.
    pub fn switch_volume(&self) -> u8 {
        let next = if self.current_volume() == 1 { 2 } else { 1 };
        self.current.store(next, Ordering::Release);
        next
    }

    /// ROM root of the active volume. Volume 2 without a secondary root
    /// falls back to the primary.
    pub fn roms_root(&self) -> &Path {
        match (&self.secondary, self.current_volume()) {
            (Some(secondary), 2) => secondary,
            _ => &self.primary,
        }
    }

    /// Folder a platform's titles are stored in on the active volume.
    pub fn platform_dir(&self, resolver: &FolderResolver, platform_slug: &str) -> PathBuf {
        self.roms_root().join(resolver.resolve(platform_slug))
    }

    /// Directory for cached icons and the avatar.
    pub fn resources_dir(&self) -> &Path {
        &self.resources
    }

    /// Whether a title already exists on the active volume. Multi-file titles
    /// are detected by their playlist file.
    pub fn is_title_on_device(&self, resolver: &FolderResolver, title: &Title) -> bool {
        let name = if title.is_multi_file {
            format!("{}.m3u", title.storage_name)
        } else {
            title.storage_name.clone()
        };
        self.platform_dir(resolver, &title.platform_slug)
            .join(name)
            .exists()
    }
}
