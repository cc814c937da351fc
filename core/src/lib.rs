//! RomM Sync Core - catalog sync and transfer engine
//!
//! This crate keeps a handheld device's ROM folders in step with a RomM
//! server: it fetches the remote catalog, filters it against what the
//! device can store, and downloads queued titles with progress and
//! cancellation.
//!
//! # Architecture
//!
//! - [`SyncStatus`] - Shared state written by the worker, polled by the UI
//! - [`CatalogClient`] - Profile, platform, collection and title fetches
//! - [`TransferEngine`] - Drains the download queue, extracting archives
//! - [`WorkerHandle`] - Background thread that runs both in command order
//! - [`Transport`] - HTTP seam, backed by `reqwest` in production

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
#[cfg(test)]
mod integration;
pub mod model;
pub mod platforms;
pub mod status;
pub mod storage;
#[cfg(test)]
pub mod test_utils;
pub mod transfer;
pub mod transport;
pub mod worker;

// Re-export the types most callers need
pub use catalog::CatalogClient;
pub use config::SyncConfig;
pub use context::SyncContext;
pub use error::SyncError;
pub use model::{Collection, Platform, Selection, Title, UserProfile};
pub use platforms::{DeviceProfile, FolderResolver};
pub use status::{Signal, SyncStatus, TransferProgress};
pub use storage::StorageLayout;
pub use transfer::TransferEngine;
pub use transport::{ApiRequest, Credentials, HttpTransport, Transport, TransportError};
pub use worker::{Command, WorkerHandle};
