//! Shared sync state polled by the UI
//!
//! [`SyncStatus`] is the one structure the worker writes into and the UI
//! reads from. Every field family has a single writer:
//!
//! - the worker owns connectivity flags, catalog lists, the profile,
//!   transfer progress and the readiness signals;
//! - the consumer owns the selection, the download queue contents and
//!   the cancellation request (the worker only clears the queue when a
//!   drain ends and consumes the cancellation when one starts).
//!
//! Scalars are atomics so polling never blocks; lists sit behind short
//! `RwLock` sections that readers clone out of.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::model::{Collection, Platform, Selection, Title, UserProfile};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Level-triggered completion marker.
///
/// Once raised it stays raised until the next operation of the same kind
/// clears it, so a reader that polls late still sees the completion.
#[derive(Debug, Default)]
pub struct Signal {
    raised: AtomicBool,
    raises: AtomicU64,
    lock: Mutex<()>,
    cond: Condvar,
}

impl Signal {
    pub fn raise(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.raised.store(true, Ordering::Release);
        self.raises.fetch_add(1, Ordering::AcqRel);
        self.cond.notify_all();
    }

    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Total number of times this signal has been raised.
    pub fn raise_count(&self) -> u64 {
        self.raises.load(Ordering::Acquire)
    }

    /// Block until raised or until `timeout` elapses. Returns the final state.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .cond
            .wait_timeout_while(guard, timeout, |_| !self.is_raised())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_raised()
    }
}

/// Percentage stored as `f32` bits.
#[derive(Debug, Default)]
struct AtomicPercent(AtomicU32);

impl AtomicPercent {
    fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Point-in-time view of the transfer fields, for painting a progress bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferProgress {
    pub title: Option<Title>,
    /// 1-based position of `title` in the sorted queue.
    pub position: usize,
    pub queue_len: usize,
    pub transferred_bytes: u64,
    pub download_percent: f32,
    pub extracting: bool,
    pub extract_percent: f32,
}

/// Process-wide sync state. Create once and share through `Arc`.
#[derive(Debug, Default)]
pub struct SyncStatus {
    valid_host: AtomicBool,
    valid_credentials: AtomicBool,

    profile: RwLock<Option<UserProfile>>,
    avatar: RwLock<Option<PathBuf>>,
    platforms: RwLock<Vec<Platform>>,
    collections: RwLock<Vec<Collection>>,
    titles: RwLock<Vec<Title>>,

    selection: RwLock<Selection>,
    download_queue: RwLock<Vec<Title>>,

    current_title: RwLock<Option<Title>>,
    queue_position: AtomicUsize,
    transferred_bytes: AtomicU64,
    download_percent: AtomicPercent,
    extracting: AtomicBool,
    extract_percent: AtomicPercent,

    last_fault: RwLock<Option<String>>,

    cancel: Signal,
    pub profile_ready: Signal,
    pub platforms_ready: Signal,
    pub collections_ready: Signal,
    pub titles_ready: Signal,
    pub download_ready: Signal,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    // =============================================================
    // Connectivity
    // =============================================================

    pub fn valid_host(&self) -> bool {
        self.valid_host.load(Ordering::Acquire)
    }

    pub fn valid_credentials(&self) -> bool {
        self.valid_credentials.load(Ordering::Acquire)
    }

    pub(crate) fn set_connection(&self, valid_host: bool, valid_credentials: bool) {
        self.valid_host.store(valid_host, Ordering::Release);
        self.valid_credentials.store(valid_credentials, Ordering::Release);
    }

    pub(crate) fn set_valid_host(&self, valid_host: bool) {
        self.valid_host.store(valid_host, Ordering::Release);
    }

    /// Description of the fault that stopped the worker, if any.
    pub fn last_fault(&self) -> Option<String> {
        read(&self.last_fault).clone()
    }

    pub(crate) fn set_last_fault(&self, fault: String) {
        *write(&self.last_fault) = Some(fault);
    }

    // =============================================================
    // Catalog lists
    // =============================================================

    pub fn profile(&self) -> Option<UserProfile> {
        read(&self.profile).clone()
    }

    pub(crate) fn set_profile(&self, profile: Option<UserProfile>) {
        *write(&self.profile) = profile;
    }

    /// Local path of the downloaded avatar image.
    pub fn avatar(&self) -> Option<PathBuf> {
        read(&self.avatar).clone()
    }

    pub(crate) fn set_avatar(&self, path: Option<PathBuf>) {
        *write(&self.avatar) = path;
    }

    pub fn platforms(&self) -> Vec<Platform> {
        read(&self.platforms).clone()
    }

    pub(crate) fn set_platforms(&self, platforms: Vec<Platform>) {
        *write(&self.platforms) = platforms;
    }

    pub fn collections(&self) -> Vec<Collection> {
        read(&self.collections).clone()
    }

    pub(crate) fn set_collections(&self, collections: Vec<Collection>) {
        *write(&self.collections) = collections;
    }

    pub fn titles(&self) -> Vec<Title> {
        read(&self.titles).clone()
    }

    pub(crate) fn set_titles(&self, titles: Vec<Title>) {
        *write(&self.titles) = titles;
    }

    // =============================================================
    // Selection and queue (consumer side)
    // =============================================================

    pub fn selection(&self) -> Selection {
        read(&self.selection).clone()
    }

    /// Replace the current selection. Any previous selection is dropped.
    pub fn select(&self, selection: Selection) {
        *write(&self.selection) = selection;
    }

    pub fn queue(&self) -> Vec<Title> {
        read(&self.download_queue).clone()
    }

    /// Add a title to the download queue. Returns `false` if it was already queued.
    pub fn enqueue(&self, title: Title) -> bool {
        let mut queue = write(&self.download_queue);
        if queue.iter().any(|queued| queued.id == title.id) {
            return false;
        }
        queue.push(title);
        true
    }

    /// Remove a title from the queue by id. Returns `true` if it was queued.
    pub fn dequeue(&self, title_id: u64) -> bool {
        let mut queue = write(&self.download_queue);
        let before = queue.len();
        queue.retain(|queued| queued.id != title_id);
        queue.len() != before
    }

    pub fn clear_queue(&self) {
        write(&self.download_queue).clear();
    }

    /// Sort the queue by title name and return the drain order.
    pub(crate) fn sorted_queue(&self) -> Vec<Title> {
        let mut queue = write(&self.download_queue);
        queue.sort_by(|a, b| a.name.cmp(&b.name));
        queue.clone()
    }

    // =============================================================
    // Cancellation
    // =============================================================

    /// Ask the active drain to stop at its next chunk or archive entry.
    pub fn request_cancel(&self) {
        self.cancel.raise();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_raised()
    }

    pub(crate) fn consume_cancel(&self) {
        self.cancel.clear();
    }

    // =============================================================
    // Transfer progress
    // =============================================================

    pub fn current_title(&self) -> Option<Title> {
        read(&self.current_title).clone()
    }

    pub fn queue_position(&self) -> usize {
        self.queue_position.load(Ordering::Acquire)
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Acquire)
    }

    pub fn download_percent(&self) -> f32 {
        self.download_percent.get()
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting.load(Ordering::Acquire)
    }

    pub fn extract_percent(&self) -> f32 {
        self.extract_percent.get()
    }

    pub fn transfer_progress(&self) -> TransferProgress {
        TransferProgress {
            title: self.current_title(),
            position: self.queue_position(),
            queue_len: read(&self.download_queue).len(),
            transferred_bytes: self.transferred_bytes(),
            download_percent: self.download_percent(),
            extracting: self.is_extracting(),
            extract_percent: self.extract_percent(),
        }
    }

    pub(crate) fn begin_title(&self, title: &Title, position: usize) {
        *write(&self.current_title) = Some(title.clone());
        self.queue_position.store(position, Ordering::Release);
        self.transferred_bytes.store(0, Ordering::Release);
        self.download_percent.set(0.0);
        self.extracting.store(false, Ordering::Release);
        self.extract_percent.set(0.0);
    }

    /// Account for one written chunk. The `+ 1` keeps zero-size titles finite.
    pub(crate) fn record_chunk(&self, len: usize, expected_size: u64) {
        let total = self.transferred_bytes.fetch_add(len as u64, Ordering::AcqRel) + len as u64;
        let percent = total as f64 / (expected_size as f64 + 1.0) * 100.0;
        self.download_percent.set(percent as f32);
    }

    pub(crate) fn begin_extraction(&self) {
        self.extract_percent.set(0.0);
        self.extracting.store(true, Ordering::Release);
    }

    pub(crate) fn record_extracted(&self, extracted: u64, total: u64) {
        let percent = if total == 0 {
            100.0
        } else {
            extracted as f64 / total as f64 * 100.0
        };
        self.extract_percent.set(percent as f32);
    }

    pub(crate) fn finish_title(&self) {
        self.extracting.store(false, Ordering::Release);
        *write(&self.current_title) = None;
    }

    /// End a drain: zero every transfer field, empty the queue, publish the
    /// connection flags and raise `download_ready`.
    ///
    /// `valid_credentials` of `None` leaves the previous value in place.
    pub(crate) fn reset_transfer(&self, valid_host: bool, valid_credentials: Option<bool>) {
        self.transferred_bytes.store(0, Ordering::Release);
        self.download_percent.set(0.0);
        self.queue_position.store(0, Ordering::Release);
        self.extracting.store(false, Ordering::Release);
        self.extract_percent.set(0.0);
        *write(&self.current_title) = None;
        write(&self.download_queue).clear();

        self.set_valid_host(valid_host);
        if let Some(valid_credentials) = valid_credentials {
            self.valid_credentials.store(valid_credentials, Ordering::Release);
        }
        self.download_ready.raise();
    }
}
