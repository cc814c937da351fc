//! Multi-file title extraction

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rommsync_shared::{ensure_dir, sanitize_path};
use zip::ZipArchive;
use zip::result::ZipError;

use super::Step;
use crate::error::SyncError;
use crate::status::SyncStatus;
use crate::transport::CHUNK_SIZE;

/// Unpack `archive_path` next to itself, then delete it.
///
/// Cancellation is observed between entries. A cancelled extraction
/// removes the archive but keeps entries already written.
/// Read and decode failures surface as [`SyncError::Archive`]; write
/// failures as [`SyncError::Io`].
pub(super) fn extract_archive(
    status: &SyncStatus,
    archive_path: &Path,
) -> Result<Step, SyncError> {
    status.begin_extraction();

    let Some(dest_dir) = archive_path.parent() else {
        return Err(SyncError::Archive(ZipError::FileNotFound));
    };
    let mut archive = ZipArchive::new(BufReader::new(File::open(archive_path)?))?;

    let mut total = 0u64;
    for index in 0..archive.len() {
        total += archive.by_index_raw(index)?.size();
    }
    tracing::debug!("Extracting {} entries ({} bytes)", archive.len(), total);

    let mut extracted = 0u64;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    for index in 0..archive.len() {
        if status.is_cancel_requested() {
            remove_file(archive_path);
            return Ok(Step::Cancelled);
        }

        let mut entry = archive.by_index(index)?;
        let relative = sanitize_path(entry.name());
        let target = dest_dir.join(&relative);

        if entry.is_dir() {
            if let Err(e) = ensure_dir(&target) {
                tracing::warn!("Cannot create directory {}: {}", target.display(), e);
            }
            continue;
        }

        let (Some(parent), Some(file_name)) = (target.parent(), target.file_name()) else {
            continue;
        };
        let target = match ensure_dir(parent) {
            Ok(parent) => parent.join(file_name),
            Err(e) => {
                tracing::warn!(
                    "Cannot create directory {}: {}. Skipping entry",
                    parent.display(),
                    e
                );
                continue;
            }
        };

        let mut out = BufWriter::new(File::create(&target)?);
        loop {
            let read = entry.read(&mut buffer).map_err(ZipError::Io)?;
            if read == 0 {
                break;
            }
            out.write_all(&buffer[..read])?;
            extracted += read as u64;
            status.record_extracted(extracted, total);
        }
        out.flush()?;
    }

    if total == 0 {
        status.record_extracted(0, 0);
    }
    drop(archive);
    std::fs::remove_file(archive_path)?;
    Ok(Step::Done)
}

pub(super) fn remove_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
    }
}
