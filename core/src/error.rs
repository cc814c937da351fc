//! Error taxonomy for catalog and transfer operations

use thiserror::Error;

use crate::transport::TransportError;

/// Errors produced by catalog fetches and transfers.
///
/// Recoverable kinds are absorbed by the operation that hit them and only
/// show up as [`SyncStatus`](crate::SyncStatus) flags. The rest are returned
/// to the caller.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid remote target: {0}")]
    TargetInvalid(String),
    #[error("Connection to {url} failed: {reason}")]
    Connectivity { url: String, reason: String },
    #[error("Credentials rejected by {url}")]
    Auth { url: String },
    #[error("Server returned HTTP {status} for {url}")]
    RemoteFault { status: u16, url: String },
    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl SyncError {
    /// Classify a transport failure for the request that produced it.
    pub fn from_transport(err: TransportError, url: &str) -> Self {
        match err {
            TransportError::InvalidTarget(reason) => SyncError::TargetInvalid(reason),
            TransportError::Network(reason) => SyncError::Connectivity {
                url: url.to_string(),
                reason,
            },
            TransportError::Status(403) => SyncError::Auth {
                url: url.to_string(),
            },
            TransportError::Status(status) => SyncError::RemoteFault {
                status,
                url: url.to_string(),
            },
        }
    }

    /// Whether this error is absorbed into status flags rather than propagated.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::TargetInvalid(_) | SyncError::Connectivity { .. } | SyncError::Auth { .. }
        )
    }

    /// `(valid_host, valid_credentials)` a catalog fetch reports after this error.
    ///
    /// Only meaningful for recoverable errors.
    pub fn connection_flags(&self) -> (bool, bool) {
        match self {
            SyncError::Auth { .. } => (true, false),
            _ => (false, false),
        }
    }
}
