//! Catalog snapshots published into [`SyncStatus`](crate::SyncStatus).
//!
//! These are immutable per fetch; a new fetch replaces the previous list
//! wholesale.

use rommsync_shared::{CollectionSchema, PlatformSchema, RomSchema, UserSchema, format_size};

/// A platform that survived availability filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub id: u64,
    pub display_name: String,
    /// Slug exactly as the server reported it.
    pub slug: String,
    pub rom_count: u64,
}

impl From<PlatformSchema> for Platform {
    fn from(schema: PlatformSchema) -> Self {
        Self {
            id: schema.id,
            display_name: schema.display_name,
            slug: schema.slug,
            rom_count: schema.rom_count,
        }
    }
}

/// A regular or virtual collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub rom_count: u64,
    /// Server-computed grouping (by genre, recently added, ...)
    pub is_virtual: bool,
}

impl Collection {
    pub(crate) fn from_schema(schema: CollectionSchema, is_virtual: bool) -> Self {
        Self {
            id: schema.id,
            name: schema.name,
            rom_count: schema.rom_count,
            is_virtual,
        }
    }
}

/// A downloadable title (a rom).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub id: u64,
    pub name: String,
    /// File name on the server; also the local file name after sanitizing.
    pub storage_name: String,
    pub platform_slug: String,
    pub extension: String,
    /// Declared size of the download in bytes.
    pub size_bytes: u64,
    /// `size_bytes` formatted for display.
    pub human_size: String,
    /// Download is a zip whose contents replace it on disk.
    pub is_multi_file: bool,
    pub languages: Vec<String>,
    pub regions: Vec<String>,
    pub revision: Option<String>,
    pub tags: Vec<String>,
}

impl From<RomSchema> for Title {
    fn from(schema: RomSchema) -> Self {
        Self {
            id: schema.id,
            human_size: format_size(schema.fs_size_bytes),
            name: schema.name,
            storage_name: schema.fs_name,
            platform_slug: schema.platform_slug,
            extension: schema.fs_extension,
            size_bytes: schema.fs_size_bytes,
            is_multi_file: schema.multi,
            languages: schema.languages.unwrap_or_default(),
            regions: schema.regions.unwrap_or_default(),
            revision: schema.revision.filter(|r| !r.is_empty()),
            tags: schema.tags.unwrap_or_default(),
        }
    }
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub role: Option<String>,
    pub avatar_path: Option<String>,
}

impl From<UserSchema> for UserProfile {
    fn from(schema: UserSchema) -> Self {
        Self {
            id: schema.id,
            username: schema.username,
            role: schema.role,
            avatar_path: schema.avatar_path.filter(|p| !p.is_empty()),
        }
    }
}

/// What the title listing is scoped to.
///
/// Being an enum makes "at most one of platform / collection / virtual
/// collection" hold by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Platform(Platform),
    Collection(Collection),
    VirtualCollection(Collection),
}

impl Selection {
    /// Select a collection, routing virtual ones to the right variant.
    pub fn collection(collection: Collection) -> Self {
        if collection.is_virtual {
            Selection::VirtualCollection(collection)
        } else {
            Selection::Collection(collection)
        }
    }

    /// Query parameter scoping the title listing, e.g. `("platform_id", "4")`.
    pub fn query_scope(&self) -> Option<(&'static str, String)> {
        match self {
            Selection::None => None,
            Selection::Platform(p) => Some(("platform_id", p.id.to_string())),
            Selection::Collection(c) => Some(("collection_id", c.id.clone())),
            Selection::VirtualCollection(c) => Some(("virtual_collection_id", c.id.clone())),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(is_virtual: bool) -> Collection {
        Collection {
            id: "7".into(),
            name: "Favourites".into(),
            rom_count: 3,
            is_virtual,
        }
    }

    #[test]
    fn test_selection_routes_virtual_collections() {
        assert!(matches!(
            Selection::collection(collection(true)),
            Selection::VirtualCollection(_)
        ));
        assert!(matches!(
            Selection::collection(collection(false)),
            Selection::Collection(_)
        ));
    }

    #[test]
    fn test_query_scope_names_the_selection_kind() {
        let platform = Platform {
            id: 4,
            display_name: "Game Boy".into(),
            slug: "gb".into(),
            rom_count: 1,
        };
        assert_eq!(
            Selection::Platform(platform).query_scope(),
            Some(("platform_id", "4".to_string()))
        );
        assert_eq!(
            Selection::collection(collection(true)).query_scope(),
            Some(("virtual_collection_id", "7".to_string()))
        );
        assert_eq!(Selection::None.query_scope(), None);
    }

    #[test]
    fn test_title_from_schema_fills_human_size() {
        let schema: RomSchema = serde_json::from_str(
            r#"{"id":1,"name":"Doom","fs_name":"doom.zip","platform_slug":"dos",
                "fs_size_bytes":2048,"multi":true,"revision":"","tags":["hack"]}"#,
        )
        .unwrap();
        let title = Title::from(schema);
        assert_eq!(title.human_size, "2.00 KB");
        assert!(title.is_multi_file);
        assert_eq!(title.revision, None);
        assert_eq!(title.tags, vec!["hack".to_string()]);
    }
}
