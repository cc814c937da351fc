//! API response types for the RomM server.
//!
//! Only the fields the client actually consumes are modelled; unknown
//! fields are ignored so newer server versions keep decoding.

use serde::{Deserialize, Deserializer, Serialize};

/// A listing endpoint response.
///
/// Older servers return a bare JSON array, newer ones wrap it in a
/// pagination envelope. Both decode into the same item list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// `[ {...}, {...} ]`
    Bare(Vec<T>),
    /// `{ "items": [...], "total": n, "limit": n, "offset": n }`
    Paged(Page<T>),
}

impl<T> Listing<T> {
    /// Consume the listing, discarding any pagination metadata.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Paged(page) => page.items,
        }
    }
}

/// Pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on the current page.
    pub items: Vec<T>,
    /// Total number of items matching the query.
    #[serde(default)]
    pub total: Option<u64>,
    /// Maximum items per page.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Offset of the first item.
    #[serde(default)]
    pub offset: Option<u64>,
}

/// A platform (console/system) known to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSchema {
    /// Numeric platform identifier.
    pub id: u64,
    /// Human-facing name ("Nintendo Game Boy Advance").
    pub display_name: String,
    /// URL-safe identifier ("gba").
    pub slug: String,
    /// Number of roms the server holds for this platform.
    #[serde(default)]
    pub rom_count: u64,
}

/// A regular or virtual collection.
///
/// Regular collections use numeric ids, virtual ones use server-generated
/// string ids, so the id is normalised to a string either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection identifier.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Collection name, used for include/exclude matching.
    pub name: String,
    /// Number of roms in the collection.
    #[serde(default)]
    pub rom_count: u64,
}

/// A downloadable rom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RomSchema {
    /// Numeric rom identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// File name on the server's filesystem.
    pub fs_name: String,
    /// Slug of the platform the rom belongs to.
    pub platform_slug: String,
    /// File extension without the dot.
    #[serde(default)]
    pub fs_extension: String,
    /// Declared size of the downloadable artifact.
    #[serde(default)]
    pub fs_size_bytes: u64,
    /// True when the download is a zip of several files.
    #[serde(default)]
    pub multi: bool,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// The authenticated user (`GET api/users/me`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSchema {
    pub id: u64,
    pub username: String,
    /// Role name ("admin", "editor", "viewer").
    #[serde(default)]
    pub role: Option<String>,
    /// Avatar path relative to the server's asset root; empty when unset.
    #[serde(default)]
    pub avatar_path: Option<String>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
