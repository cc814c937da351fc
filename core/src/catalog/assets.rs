//! Platform icons and the user avatar, cached in the resources directory

use std::path::{Path, PathBuf};

use super::{CatalogClient, FETCH_TIMEOUT};
use crate::error::SyncError;

const PLATFORM_ICON_PREFIX: &str = "assets/platforms";
const AVATAR_PREFIX: &str = "assets/romm/assets";

impl CatalogClient {
    /// Download `<slug>.ico` unless it is already cached.
    ///
    /// Missing icons and recoverable failures are logged and skipped.
    pub(super) fn ensure_platform_icon(&self, slug: &str) -> Result<(), SyncError> {
        let resources = self.ctx.storage.resources_dir();
        let path = resources.join(format!("{}.ico", slug));
        if path.exists() {
            return Ok(());
        }

        let icon = self.ctx.resolver.icon_name(slug);
        let asset = format!("{}/{}.ico", PLATFORM_ICON_PREFIX, icon);
        if let Some(bytes) = self.fetch_asset(&asset)? {
            save_asset(resources, &path, &bytes);
        }
        Ok(())
    }

    /// Download the avatar to `<username>.<ext>` and return its path.
    pub(super) fn fetch_avatar(
        &self,
        username: &str,
        avatar_path: &str,
    ) -> Result<Option<PathBuf>, SyncError> {
        let asset = format!("{}/{}", AVATAR_PREFIX, avatar_path.trim_start_matches('/'));
        let Some(bytes) = self.fetch_asset(&asset)? else {
            return Ok(None);
        };

        let resources = self.ctx.storage.resources_dir();
        let path = resources.join(format!("{}.{}", username, avatar_extension(avatar_path)));
        Ok(save_asset(resources, &path, &bytes).then_some(path))
    }

    /// `Ok(None)` for 404 and recoverable failures.
    fn fetch_asset(&self, asset: &str) -> Result<Option<Vec<u8>>, SyncError> {
        let request = match self.request(asset, Some(FETCH_TIMEOUT)) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("Skipping asset: {}", err);
                return Ok(None);
            }
        };

        match self.transport.get(&request) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(crate::transport::TransportError::Status(404)) => {
                tracing::info!("Asset not found on server: {}", request.target());
                Ok(None)
            }
            Err(err) => {
                let err = SyncError::from_transport(err, request.url.as_str());
                if err.is_recoverable() {
                    tracing::warn!("Skipping asset: {}", err);
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Extension of the avatar file, ignoring any cache-busting query.
fn avatar_extension(avatar_path: &str) -> &str {
    let path = avatar_path.split('?').next().unwrap_or(avatar_path);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png")
}

fn save_asset(dir: &Path, path: &Path, bytes: &[u8]) -> bool {
    let result = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(path, bytes));
    if let Err(e) = &result {
        tracing::warn!("Failed to save {}: {}", path.display(), e);
    }
    result.is_ok()
}
