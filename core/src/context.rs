//! Process-wide device context

use crate::config::SyncConfig;
use crate::platforms::FolderResolver;
use crate::storage::StorageLayout;

/// Everything the catalog and transfer code need to know about the device.
///
/// Built once by the process and shared through `Arc`. The override map is
/// parsed into the resolver here and kept for the context's lifetime.
#[derive(Debug)]
pub struct SyncContext {
    pub config: SyncConfig,
    pub resolver: FolderResolver,
    pub storage: StorageLayout,
}

impl SyncContext {
    pub fn new(config: SyncConfig) -> Self {
        let profile = config.device_profile();
        let resolver = FolderResolver::new(profile, config.device.custom_maps.clone());
        let storage = StorageLayout::from_config(&config.storage, profile);
        tracing::info!(
            "Device profile {:?}, ROM root {}",
            profile,
            storage.roms_root().display()
        );
        Self::from_parts(config, resolver, storage)
    }

    pub fn from_parts(
        config: SyncConfig,
        resolver: FolderResolver,
        storage: StorageLayout,
    ) -> Self {
        Self {
            config,
            resolver,
            storage,
        }
    }
}
