//! Shared types for rommsync.
//!
//! Wire schemas for the RomM API plus the filesystem helpers used by both
//! the catalog and the transfer side.

pub mod api;
pub mod format;
pub mod fs;

pub use api::{CollectionSchema, Listing, Page, PlatformSchema, RomSchema, UserSchema};
pub use format::{format_size, human_readable_size};
pub use fs::{ensure_dir, find_dir_case_insensitive, sanitize_path, sanitize_segment};
