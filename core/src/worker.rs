//! Background worker thread
//!
//! All fetches and drains run on one thread, in the order their commands
//! were sent. The consumer only sends commands and polls [`SyncStatus`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::catalog::CatalogClient;
use crate::context::SyncContext;
use crate::error::SyncError;
use crate::status::SyncStatus;
use crate::transfer::TransferEngine;
use crate::transport::Transport;

/// Work the consumer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FetchProfile,
    FetchPlatforms,
    FetchCollections,
    /// Titles for the current selection
    FetchTitles,
    /// Drain the download queue
    Download,
    /// Toggle the active storage volume
    SwitchVolume,
    Shutdown,
}

/// Owner side of the worker thread.
pub struct WorkerHandle {
    sender: Sender<Command>,
    thread: JoinHandle<Result<(), SyncError>>,
}

impl WorkerHandle {
    /// Start the worker.
    pub fn spawn(
        ctx: Arc<SyncContext>,
        status: Arc<SyncStatus>,
        transport: Arc<dyn Transport>,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("rommsync-worker".into())
            .spawn(move || run(ctx, status, transport, receiver))?;
        Ok(Self { sender, thread })
    }

    /// Queue a command. Returns `false` once the worker has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Ask the worker to stop after pending commands and wait for it.
    ///
    /// Returns the fault that stopped the worker early, if any.
    pub fn shutdown(self) -> Result<(), SyncError> {
        let _ = self.sender.send(Command::Shutdown);
        self.thread
            .join()
            .unwrap_or_else(|_| Err(SyncError::Io(std::io::Error::other("worker thread panicked"))))
    }
}

fn run(
    ctx: Arc<SyncContext>,
    status: Arc<SyncStatus>,
    transport: Arc<dyn Transport>,
    receiver: Receiver<Command>,
) -> Result<(), SyncError> {
    let catalog = CatalogClient::new(Arc::clone(&ctx), Arc::clone(&status), Arc::clone(&transport));
    let transfers = TransferEngine::new(Arc::clone(&ctx), Arc::clone(&status), transport);

    tracing::debug!("Worker started");
    for command in receiver {
        tracing::debug!("Worker command: {:?}", command);
        let result = match command {
            Command::FetchProfile => catalog.fetch_profile(),
            Command::FetchPlatforms => catalog.fetch_platforms(),
            Command::FetchCollections => catalog.fetch_collections(),
            Command::FetchTitles => catalog.fetch_titles(),
            Command::Download => transfers.download(),
            Command::SwitchVolume => {
                let volume = ctx.storage.switch_volume();
                tracing::info!(
                    "Switched to volume {} ({})",
                    volume,
                    ctx.storage.roms_root().display()
                );
                Ok(())
            }
            Command::Shutdown => break,
        };

        if let Err(err) = result {
            tracing::error!("Worker stopped: {}", err);
            status.set_last_fault(err.to_string());
            return Err(err);
        }
    }
    tracing::debug!("Worker stopped");
    Ok(())
}
