//! Download queue draining
//!
//! [`TransferEngine::download`] drains the queue in name order, one title
//! at a time: stream the content to disk, extract multi-file titles, and
//! publish progress into [`SyncStatus`] as it goes.
//!
//! Cancellation is cooperative. It is checked before every chunk read and
//! between archive entries; a cancelled drain removes the partial file and
//! discards the rest of the queue.

mod extract;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashSet;
use rommsync_shared::{ensure_dir, sanitize_path};

use crate::catalog::ROMS_ENDPOINT;
use crate::context::SyncContext;
use crate::error::SyncError;
use crate::model::Title;
use crate::status::SyncStatus;
use crate::transport::{ApiRequest, Transport};

use extract::{extract_archive, remove_file};

/// How a single title ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Done,
    Cancelled,
}

/// Drains the download queue.
pub struct TransferEngine {
    ctx: Arc<SyncContext>,
    status: Arc<SyncStatus>,
    transport: Arc<dyn Transport>,
}

impl TransferEngine {
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

    /// Download every queued title.
    ///
    /// Returns `Err` only for failures that are not reflected in the
    /// connection flags (server errors, local I/O). Every other ending
    /// clears the queue and raises `download_ready`.
    ///
    /// Titles enqueued while the drain runs are picked up after the
    /// current batch, again in name order.
    pub fn download(&self) -> Result<(), SyncError> {
        self.status.consume_cancel();
        let mut drained = HashSet::new();
        let mut position = 0;

        loop {
            let batch: Vec<Title> = self
                .status
                .sorted_queue()
                .into_iter()
                .filter(|title| !drained.contains(&title.id))
                .collect();
            if batch.is_empty() {
                break;
            }
            tracing::info!("Downloading {} titles", batch.len());

            for title in &batch {
                drained.insert(title.id);
                position += 1;
                self.status.begin_title(title, position);

                let Some(dest) = self.destination(title) else {
                    continue;
                };

                match self.transfer_title(title, &dest) {
                    Ok(Step::Done) => {}
                    Ok(Step::Cancelled) => {
                        tracing::info!("Download cancelled during {}", title.name);
                        self.status.reset_transfer(true, Some(true));
                        return Ok(());
                    }
                    Err(err) => return self.abort(err),
                }
            }
        }

        self.status.reset_transfer(true, Some(true));
        Ok(())
    }

    /// Destination file for a title, creating its folder. `None` skips the title.
    fn destination(&self, title: &Title) -> Option<PathBuf> {
        let platform_dir = self
            .ctx
            .storage
            .platform_dir(&self.ctx.resolver, &title.platform_slug);
        let path = platform_dir.join(sanitize_path(&title.storage_name));
        let (parent, file_name) = (path.parent()?, path.file_name()?);

        match ensure_dir(parent) {
            Ok(parent) => Some(parent.join(file_name)),
            Err(e) => {
                tracing::warn!(
                    "Cannot create or access directory {}: {}. Skipping {}",
                    parent.display(),
                    e,
                    title.name
                );
                None
            }
        }
    }

    fn transfer_title(&self, title: &Title, dest: &Path) -> Result<Step, SyncError> {
        let path = format!("{}/{}/content", ROMS_ENDPOINT, title.id);
        let request = ApiRequest::new(&self.ctx.config.server.host, &path, None)
            .map_err(|e| SyncError::from_transport(e, &path))?
            .with_segment(&title.storage_name)
            .with_query([("hidden_folder", "true")]);

        tracing::info!("Downloading {} to {}", title.name, dest.display());
        let result = self.stream_to_file(title, &request, dest);
        if !matches!(result, Ok(Step::Done)) {
            remove_file(dest);
        }
        if result? == Step::Cancelled {
            return Ok(Step::Cancelled);
        }

        if title.is_multi_file {
            match extract_archive(&self.status, dest) {
                Ok(Step::Done) => tracing::info!("Extracted {}", title.name),
                Ok(Step::Cancelled) => return Ok(Step::Cancelled),
                Err(SyncError::Archive(e)) => {
                    tracing::warn!("Failed to extract {}: {}. Keeping archive", title.name, e);
                }
                Err(err) => return Err(err),
            }
        }

        self.status.finish_title();
        Ok(Step::Done)
    }

    fn stream_to_file(
        &self,
        title: &Title,
        request: &ApiRequest,
        dest: &Path,
    ) -> Result<Step, SyncError> {
        let url = request.url.as_str();
        let mut stream = self
            .transport
            .open(request)
            .map_err(|e| SyncError::from_transport(e, url))?;
        let mut file = BufWriter::new(File::create(dest)?);
        self.status.set_connection(true, true);

        loop {
            if self.status.is_cancel_requested() {
                return Ok(Step::Cancelled);
            }
            let Some(chunk) = stream
                .next_chunk()
                .map_err(|e| SyncError::from_transport(e, url))?
            else {
                break;
            };
            file.write_all(&chunk)?;
            self.status.record_chunk(chunk.len(), title.size_bytes);
        }

        file.flush()?;
        tracing::debug!("Finished {} ({} bytes)", title.name, self.status.transferred_bytes());
        Ok(Step::Done)
    }

    /// Absorb recoverable failures into the connection flags.
    fn abort(&self, err: SyncError) -> Result<(), SyncError> {
        match err {
            SyncError::TargetInvalid(_) => {
                tracing::warn!("{}", err);
                self.status.reset_transfer(false, Some(false));
                Ok(())
            }
            SyncError::Auth { .. } => {
                tracing::warn!("{}", err);
                self.status.reset_transfer(true, Some(false));
                Ok(())
            }
            SyncError::Connectivity { .. } => {
                tracing::warn!("{}", err);
                self.status.reset_transfer(true, None);
                Ok(())
            }
            err => {
                tracing::error!("Download failed: {}", err);
                Err(err)
            }
        }
    }
}
