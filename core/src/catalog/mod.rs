//! Remote catalog fetching
//!
//! Each fetch sends one authenticated read to the server, decodes the
//! listing, filters it for this device and publishes the result into
//! [`SyncStatus`], then raises that fetch's readiness signal.
//!
//! Recoverable failures (bad target, network, 403) clear the list and set
//! the connectivity flags; the readiness signal is still raised so waiters
//! never hang. Any other HTTP failure is returned to the caller.

mod assets;
mod filter;

use std::sync::Arc;
use std::time::Duration;

use rommsync_shared::{CollectionSchema, Listing, PlatformSchema, RomSchema, UserSchema};
use serde::de::DeserializeOwned;

pub use filter::{Availability, CollectionFilter, platform_exclusions};

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::model::{Collection, Platform, Selection, Title, UserProfile};
use crate::status::{Signal, SyncStatus};
use crate::transport::{ApiRequest, Transport};

pub(crate) const PLATFORMS_ENDPOINT: &str = "api/platforms";
pub(crate) const COLLECTIONS_ENDPOINT: &str = "api/collections";
pub(crate) const VIRTUAL_COLLECTIONS_ENDPOINT: &str = "api/collections/virtual";
pub(crate) const ROMS_ENDPOINT: &str = "api/roms";
pub(crate) const USER_ME_ENDPOINT: &str = "api/users/me";

/// Timeout for listings and small assets
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);
/// Title listings can be very large
pub const TITLE_LISTING_TIMEOUT: Duration = Duration::from_secs(1800);
/// Maximum titles requested per listing
pub const TITLE_LIMIT: usize = 1000;

/// Fetches the remote catalog into [`SyncStatus`].
pub struct CatalogClient {
    ctx: Arc<SyncContext>,
    status: Arc<SyncStatus>,
    transport: Arc<dyn Transport>,
}

impl CatalogClient {
    pub fn new(
        ctx: Arc<SyncContext>,
        status: Arc<SyncStatus>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            ctx,
            status,
            transport,
        }
    }

    /// Fetch the signed-in user and their avatar.
    pub fn fetch_profile(&self) -> Result<(), SyncError> {
        self.status.profile_ready.clear();
        let result = self.load_profile();
        self.publish(result, &self.status.profile_ready, |status, loaded| {
            let (profile, avatar) = match loaded {
                Some((profile, avatar)) => (Some(profile), avatar),
                None => (None, None),
            };
            status.set_profile(profile);
            status.set_avatar(avatar);
        })
    }

    /// Fetch platforms that have titles and are usable on this device.
    pub fn fetch_platforms(&self) -> Result<(), SyncError> {
        self.status.platforms_ready.clear();
        let result = self.load_platforms();
        self.publish(result, &self.status.platforms_ready, |status, platforms| {
            status.set_platforms(platforms.unwrap_or_default());
        })
    }

    /// Fetch regular then virtual collections as one list.
    pub fn fetch_collections(&self) -> Result<(), SyncError> {
        self.status.collections_ready.clear();
        let result = self.load_collections();
        self.publish(result, &self.status.collections_ready, |status, collections| {
            status.set_collections(collections.unwrap_or_default());
        })
    }

    /// Fetch titles for the current selection.
    ///
    /// Without a selection the title list is cleared and the signal raised
    /// without contacting the server.
    pub fn fetch_titles(&self) -> Result<(), SyncError> {
        self.status.titles_ready.clear();

        let selection = self.status.selection();
        if selection.is_none() {
            tracing::warn!("Title fetch requested without a selection");
            self.status.set_titles(Vec::new());
            self.status.titles_ready.raise();
            return Ok(());
        }

        let result = self.load_titles(&selection);
        self.publish(result, &self.status.titles_ready, |status, titles| {
            status.set_titles(titles.unwrap_or_default());
        })
    }

    /// Store a fetch outcome and raise its signal.
    ///
    /// `store` receives `None` when a recoverable failure cleared the data.
    fn publish<T, F>(
        &self,
        result: Result<T, SyncError>,
        ready: &Signal,
        store: F,
    ) -> Result<(), SyncError>
    where
        F: FnOnce(&SyncStatus, Option<T>),
    {
        match result {
            Ok(value) => {
                store(self.status.as_ref(), Some(value));
                self.status.set_connection(true, true);
                ready.raise();
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!("{}", err);
                store(self.status.as_ref(), None);
                let (valid_host, valid_credentials) = err.connection_flags();
                self.status.set_connection(valid_host, valid_credentials);
                ready.raise();
                Ok(())
            }
            Err(err) => {
                tracing::error!("{}", err);
                Err(err)
            }
        }
    }

    fn load_profile(&self) -> Result<(UserProfile, Option<std::path::PathBuf>), SyncError> {
        let request = self.request(USER_ME_ENDPOINT, Some(FETCH_TIMEOUT))?;
        let user: UserSchema = self.get_json(&request)?;
        let profile = UserProfile::from(user);
        let avatar = match &profile.avatar_path {
            Some(avatar_path) => self.fetch_avatar(&profile.username, avatar_path)?,
            None => None,
        };
        tracing::info!("Signed in as {}", profile.username);
        Ok((profile, avatar))
    }

    fn load_platforms(&self) -> Result<Vec<Platform>, SyncError> {
        let request = self.request(PLATFORMS_ENDPOINT, Some(FETCH_TIMEOUT))?;
        let listing: Listing<PlatformSchema> = self.get_json(&request)?;

        let availability = Availability::for_device(&self.ctx);
        let excluded = platform_exclusions(&self.ctx.config.filters.exclude_platforms);

        let platforms: Vec<Platform> = listing
            .into_items()
            .into_iter()
            .filter(|platform| platform.rom_count > 0)
            .filter(|platform| {
                availability.allows(&platform.slug)
                    && !excluded.contains(&platform.slug.to_lowercase())
            })
            .map(Platform::from)
            .collect();

        for platform in &platforms {
            self.ensure_platform_icon(&platform.slug)?;
        }

        tracing::info!("Fetched {} platforms", platforms.len());
        Ok(platforms)
    }

    fn load_collections(&self) -> Result<Vec<Collection>, SyncError> {
        let filters = &self.ctx.config.filters;
        let regular_request = self.request(COLLECTIONS_ENDPOINT, Some(FETCH_TIMEOUT))?;
        let virtual_request = self
            .request(VIRTUAL_COLLECTIONS_ENDPOINT, Some(FETCH_TIMEOUT))?
            .with_query([("type", filters.collection_type.as_str())]);

        let regular: Listing<CollectionSchema> = self.get_json(&regular_request)?;
        let virtuals: Listing<CollectionSchema> = self.get_json(&virtual_request)?;

        let filter =
            CollectionFilter::new(&filters.include_collections, &filters.exclude_collections);
        let collections: Vec<Collection> = regular
            .into_items()
            .into_iter()
            .map(|schema| (schema, false))
            .chain(virtuals.into_items().into_iter().map(|schema| (schema, true)))
            .filter(|(schema, _)| schema.rom_count > 0 && filter.allows(&schema.name))
            .map(|(schema, is_virtual)| Collection::from_schema(schema, is_virtual))
            .collect();

        tracing::info!("Fetched {} collections", collections.len());
        Ok(collections)
    }

    fn load_titles(&self, selection: &Selection) -> Result<Vec<Title>, SyncError> {
        let Some((scope_key, scope_id)) = selection.query_scope() else {
            return Ok(Vec::new());
        };
        let limit = TITLE_LIMIT.to_string();
        let request = self
            .request(ROMS_ENDPOINT, Some(TITLE_LISTING_TIMEOUT))?
            .with_query([
                (scope_key, scope_id.as_str()),
                ("order_by", "name"),
                ("order_dir", "asc"),
                ("limit", limit.as_str()),
            ]);
        let listing: Listing<RomSchema> = self.get_json(&request)?;

        let availability = Availability::for_device(&self.ctx);
        // Guards against the server returning titles outside the selected platform
        let selected_slug = match selection {
            Selection::Platform(platform) => Some(platform.slug.to_lowercase()),
            _ => None,
        };

        let titles: Vec<Title> = listing
            .into_items()
            .into_iter()
            .filter(|rom| availability.allows(&rom.platform_slug))
            .filter(|rom| {
                selected_slug
                    .as_deref()
                    .is_none_or(|slug| rom.platform_slug.to_lowercase() == slug)
            })
            .map(Title::from)
            .collect();

        tracing::info!("Fetched {} titles", titles.len());
        Ok(titles)
    }

    pub(crate) fn request(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<ApiRequest, SyncError> {
        ApiRequest::new(&self.ctx.config.server.host, path, timeout)
            .map_err(|e| SyncError::from_transport(e, path))
    }

    fn get_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, SyncError> {
        let body = self
            .transport
            .get(request)
            .map_err(|e| SyncError::from_transport(e, request.url.as_str()))?;
        serde_json::from_slice(&body).map_err(|source| SyncError::Decode {
            url: request.url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::platforms::DeviceProfile;
    use crate::test_utils::{self, FakeTransport, platform_json, rom_json};
    use crate::transport::TransportError;
    use serde_json::json;

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: std::path::PathBuf,
        status: Arc<SyncStatus>,
        transport: Arc<FakeTransport>,
        client: CatalogClient,
    }

    fn fixture(profile: DeviceProfile, config: SyncConfig) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let ctx = Arc::new(test_utils::context(&root, profile, config));
        let status = Arc::new(SyncStatus::new());
        let transport = Arc::new(FakeTransport::new());
        let client = CatalogClient::new(ctx, Arc::clone(&status), transport.clone());
        Fixture {
            _tmp: tmp,
            root,
            status,
            transport,
            client,
        }
    }

    fn mkdirs(root: &std::path::Path, folders: &[&str]) {
        for folder in folders {
            std::fs::create_dir_all(root.join("roms").join(folder)).unwrap();
        }
    }

    fn platform(id: u64, slug: &str) -> Platform {
        Platform {
            id,
            display_name: slug.to_uppercase(),
            slug: slug.into(),
            rom_count: 1,
        }
    }

    // =============================================================
    // Platforms
    // =============================================================

    #[test]
    fn test_platforms_filtered_by_local_folders() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba", "gamecube"]);
        f.transport.json(
            "/api/platforms",
            json!([
                platform_json(1, "gba", 10),
                platform_json(2, "ngc", 4),
                platform_json(3, "snes", 7),
                platform_json(4, "gb", 0),
            ]),
        );

        f.client.fetch_platforms().unwrap();

        let slugs: Vec<_> = f.status.platforms().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["gba", "ngc"]);
        assert!(f.status.valid_host() && f.status.valid_credentials());
        assert!(f.status.platforms_ready.is_raised());
    }

    #[test]
    fn test_platforms_filtered_by_fixed_table_on_muos() {
        let mut config = SyncConfig::default();
        config.device.custom_maps.insert("pico8".into(), "PICO".into());
        let f = fixture(DeviceProfile::MuOs, config);
        f.transport.json(
            "/api/platforms",
            json!({"items": [
                platform_json(1, "gba", 10),
                platform_json(2, "ps3", 4),
                platform_json(3, "PICO8", 2),
            ], "total": 3}),
        );

        f.client.fetch_platforms().unwrap();

        let slugs: Vec<_> = f.status.platforms().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["gba", "PICO8"]);
    }

    #[test]
    fn test_excluded_platform_is_omitted() {
        let mut config = SyncConfig::default();
        config.filters.exclude_platforms = vec!["genesis".into()];
        let f = fixture(DeviceProfile::Generic, config);
        mkdirs(&f.root, &["genesis", "gba"]);
        f.transport.json(
            "/api/platforms",
            json!([platform_json(1, "genesis", 10), platform_json(2, "gba", 3)]),
        );

        f.client.fetch_platforms().unwrap();

        let slugs: Vec<_> = f.status.platforms().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["gba"]);
    }

    #[test]
    fn test_platform_icons_fetched_once() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["megadrive"]);
        f.transport
            .json("/api/platforms", json!([platform_json(1, "megadrive", 2)]))
            .reply(
                "/assets/platforms/genesis.ico",
                test_utils::Reply::Body(b"ICON".to_vec()),
            );

        f.client.fetch_platforms().unwrap();
        let icon = f.root.join("resources").join("megadrive.ico");
        assert_eq!(std::fs::read(&icon).unwrap(), b"ICON");

        f.client.fetch_platforms().unwrap();
        let icon_requests = f
            .transport
            .targets()
            .into_iter()
            .filter(|t| t.starts_with("/assets/platforms"))
            .count();
        assert_eq!(icon_requests, 1);
    }

    #[test]
    fn test_missing_icon_is_tolerated() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba"]);
        f.transport
            .json("/api/platforms", json!([platform_json(1, "gba", 2)]));

        f.client.fetch_platforms().unwrap();
        assert_eq!(f.status.platforms().len(), 1);
        assert!(!f.root.join("resources").join("gba.ico").exists());
    }

    #[test]
    fn test_network_failure_clears_list_and_invalidates_host() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba"]);
        f.transport.json("/api/platforms", json!([platform_json(1, "gba", 2)]));
        f.client.fetch_platforms().unwrap();
        assert_eq!(f.status.platforms().len(), 1);

        f.transport.fail("/api/platforms", TransportError::Network("refused".into()));
        f.client.fetch_platforms().unwrap();

        assert!(f.status.platforms().is_empty());
        assert!(!f.status.valid_host());
        assert!(!f.status.valid_credentials());
        assert!(f.status.platforms_ready.is_raised());
        assert_eq!(f.status.platforms_ready.raise_count(), 2);
    }

    #[test]
    fn test_forbidden_marks_credentials_invalid() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport.fail("/api/platforms", TransportError::Status(403));

        f.client.fetch_platforms().unwrap();

        assert!(f.status.valid_host());
        assert!(!f.status.valid_credentials());
        assert!(f.status.platforms_ready.is_raised());
    }

    #[test]
    fn test_server_error_propagates() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport.fail("/api/platforms", TransportError::Status(500));

        let err = f.client.fetch_platforms().unwrap_err();
        assert!(matches!(err, SyncError::RemoteFault { status: 500, .. }));
        assert!(!f.status.platforms_ready.is_raised());
    }

    #[test]
    fn test_invalid_host_is_target_failure() {
        let mut config = SyncConfig::default();
        config.device.profile = Some(DeviceProfile::Generic);
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_utils::context(tmp.path(), DeviceProfile::Generic, config);
        ctx.config.server.host = "ftp://romm.test".into();
        let status = Arc::new(SyncStatus::new());
        let transport = Arc::new(FakeTransport::new());
        let client = CatalogClient::new(Arc::new(ctx), Arc::clone(&status), transport.clone());

        client.fetch_collections().unwrap();

        assert!(transport.requests().is_empty());
        assert!(!status.valid_host());
        assert!(status.collections_ready.is_raised());
    }

    // =============================================================
    // Collections
    // =============================================================

    #[test]
    fn test_collections_merge_regular_then_virtual() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport
            .json(
                "/api/collections",
                json!([
                    {"id": 1, "name": "Favourites", "rom_count": 3},
                    {"id": 2, "name": "Empty", "rom_count": 0}
                ]),
            )
            .json(
                "/api/collections/virtual?type=collection",
                json!([{"id": "recent", "name": "Recently Added", "rom_count": 9}]),
            );

        f.client.fetch_collections().unwrap();

        let collections = f.status.collections();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].name, "Favourites");
        assert!(!collections[0].is_virtual);
        assert_eq!(collections[1].id, "recent");
        assert!(collections[1].is_virtual);
    }

    #[test]
    fn test_collection_type_scopes_virtual_request() {
        let mut config = SyncConfig::default();
        config.filters.collection_type = "genre".into();
        let f = fixture(DeviceProfile::Generic, config);
        f.transport
            .json("/api/collections", json!([]))
            .json(
                "/api/collections/virtual?type=genre",
                json!({"items": [{"id": "rpg", "name": "RPG", "rom_count": 2}], "total": 1}),
            );

        f.client.fetch_collections().unwrap();
        assert_eq!(f.status.collections()[0].name, "RPG");
    }

    #[test]
    fn test_include_list_ignores_exclude_list() {
        let mut config = SyncConfig::default();
        config.filters.include_collections = vec!["Favourites".into()];
        config.filters.exclude_collections = vec!["Favourites".into()];
        let f = fixture(DeviceProfile::Generic, config);
        f.transport
            .json(
                "/api/collections",
                json!([
                    {"id": 1, "name": "Favourites", "rom_count": 3},
                    {"id": 2, "name": "Backlog", "rom_count": 3}
                ]),
            )
            .json("/api/collections/virtual?type=collection", json!([]));

        f.client.fetch_collections().unwrap();

        let names: Vec<_> = f.status.collections().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Favourites"]);
    }

    #[test]
    fn test_virtual_collection_failure_clears_everything() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport
            .json("/api/collections", json!([{"id": 1, "name": "A", "rom_count": 1}]))
            .fail(
                "/api/collections/virtual?type=collection",
                TransportError::Status(403),
            );

        f.client.fetch_collections().unwrap();
        assert!(f.status.collections().is_empty());
        assert!(!f.status.valid_credentials());
    }

    // =============================================================
    // Titles
    // =============================================================

    #[test]
    fn test_titles_request_is_scoped_and_ordered() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba"]);
        f.status.select(Selection::Platform(platform(4, "gba")));
        f.transport.json(
            "/api/roms?platform_id=4&order_by=name&order_dir=asc&limit=1000",
            json!({
                "items": [rom_json(1, "Advance Wars", "gba")],
                "total": 1,
                "limit": 1000,
                "offset": 0
            }),
        );

        f.client.fetch_titles().unwrap();

        assert_eq!(f.status.titles().len(), 1);
        let request = &f.transport.requests()[0];
        assert_eq!(request.timeout, Some(TITLE_LISTING_TIMEOUT));
    }

    #[test]
    fn test_titles_outside_selected_platform_are_dropped() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba", "gb"]);
        f.status.select(Selection::Platform(platform(4, "GBA")));
        f.transport.json(
            "/api/roms?platform_id=4&order_by=name&order_dir=asc&limit=1000",
            json!([rom_json(1, "Advance Wars", "gba"), rom_json(2, "Tetris", "gb")]),
        );

        f.client.fetch_titles().unwrap();

        let names: Vec<_> = f.status.titles().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Advance Wars"]);
    }

    #[test]
    fn test_collection_titles_keep_mixed_platforms() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba", "gb"]);
        f.status.select(Selection::collection(Collection {
            id: "recent".into(),
            name: "Recent".into(),
            rom_count: 3,
            is_virtual: true,
        }));
        f.transport.json(
            "/api/roms?virtual_collection_id=recent&order_by=name&order_dir=asc&limit=1000",
            json!([
                rom_json(1, "Advance Wars", "gba"),
                rom_json(2, "Tetris", "gb"),
                rom_json(3, "Wipeout", "psx")
            ]),
        );

        f.client.fetch_titles().unwrap();

        let names: Vec<_> = f.status.titles().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Advance Wars", "Tetris"]);
    }

    #[test]
    fn test_titles_without_selection_raise_signal() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.client.fetch_titles().unwrap();
        assert!(f.status.titles_ready.is_raised());
        assert!(f.transport.requests().is_empty());
    }

    #[test]
    fn test_title_fetch_is_idempotent() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        mkdirs(&f.root, &["gba"]);
        f.status.select(Selection::Platform(platform(4, "gba")));
        f.transport.json(
            "/api/roms?platform_id=4&order_by=name&order_dir=asc&limit=1000",
            json!([rom_json(1, "Advance Wars", "gba"), rom_json(2, "Zelda", "gba")]),
        );

        f.client.fetch_titles().unwrap();
        let first = f.status.titles();
        f.client.fetch_titles().unwrap();
        assert_eq!(first, f.status.titles());
    }

    // =============================================================
    // Profile
    // =============================================================

    #[test]
    fn test_profile_downloads_avatar() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport
            .json(
                "/api/users/me",
                json!({
                    "id": 1,
                    "username": "ash",
                    "role": "admin",
                    "avatar_path": "users/1/avatar.png"
                }),
            )
            .reply(
                "/assets/romm/assets/users/1/avatar.png",
                test_utils::Reply::Body(b"PNG".to_vec()),
            );

        f.client.fetch_profile().unwrap();

        assert_eq!(f.status.profile().unwrap().username, "ash");
        let avatar = f.status.avatar().unwrap();
        assert_eq!(avatar, f.root.join("resources").join("ash.png"));
        assert_eq!(std::fs::read(avatar).unwrap(), b"PNG");
        assert!(f.status.profile_ready.is_raised());
    }

    #[test]
    fn test_profile_without_avatar() {
        let f = fixture(DeviceProfile::Generic, SyncConfig::default());
        f.transport
            .json("/api/users/me", json!({"id": 1, "username": "ash", "avatar_path": ""}));

        f.client.fetch_profile().unwrap();
        assert!(f.status.profile().is_some());
        assert!(f.status.avatar().is_none());
        assert_eq!(f.transport.requests().len(), 1);
    }
}
