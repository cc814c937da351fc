//! Catalog filtering against the device and operator lists

use std::path::Path;

use hashbrown::HashSet;

use crate::context::SyncContext;
use crate::platforms::FolderResolver;
use crate::storage::list_local_platform_folders;

/// Decides whether a platform slug is usable on this device.
///
/// The two variants have different trust models and stay separate:
/// fixed-catalog devices trust their built-in table (plus overrides) and
/// never touch the filesystem; open-catalog devices only accept platforms
/// whose resolved folder already exists on the active volume.
#[derive(Debug)]
pub enum Availability<'a> {
    Table(&'a FolderResolver),
    LocalFolders {
        resolver: &'a FolderResolver,
        /// Case-folded folder names under the ROM root
        folders: HashSet<String>,
    },
}

impl<'a> Availability<'a> {
    pub fn for_device(ctx: &'a SyncContext) -> Self {
        if ctx.resolver.profile().has_fixed_catalog() {
            Availability::Table(&ctx.resolver)
        } else {
            let root = ctx.storage.roms_root();
            tracing::debug!("Probing platform folders under {}", root.display());
            Availability::LocalFolders {
                resolver: &ctx.resolver,
                folders: list_local_platform_folders(root),
            }
        }
    }

    pub fn allows(&self, slug: &str) -> bool {
        match self {
            Availability::Table(resolver) => resolver.is_supported(slug),
            Availability::LocalFolders { resolver, folders } => {
                let folder = resolver.resolve(slug);
                // An override may name a nested path; only its last component
                // is a platform folder.
                let name = Path::new(&folder)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_lowercase())
                    .unwrap_or_else(|| folder.to_lowercase());
                folders.contains(&name)
            }
        }
    }
}

/// Lower-cased set of excluded platform slugs.
pub fn platform_exclusions(slugs: &[String]) -> HashSet<String> {
    slugs.iter().map(|slug| slug.to_lowercase()).collect()
}

/// Collection include/exclude lists.
///
/// A non-empty include list replaces the exclude list entirely.
#[derive(Debug)]
pub struct CollectionFilter<'a> {
    include: HashSet<&'a str>,
    exclude: HashSet<&'a str>,
}

impl<'a> CollectionFilter<'a> {
    pub fn new(include: &'a [String], exclude: &'a [String]) -> Self {
        Self {
            include: include.iter().map(String::as_str).collect(),
            exclude: exclude.iter().map(String::as_str).collect(),
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        if !self.include.is_empty() {
            self.include.contains(name)
        } else {
            !self.exclude.contains(name)
        }
    }
}
