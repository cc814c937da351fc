//! Shared test utilities for unit and scenario tests

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use crate::config::SyncConfig;
use crate::context::SyncContext;
use crate::model::Title;
use crate::platforms::{DeviceProfile, FolderResolver};
use crate::storage::StorageLayout;
use crate::transport::{ApiRequest, ChunkStream, Transport, TransportError};

pub const HOST: &str = "http://romm.test";

/// Canned reply for one request target.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Fail(TransportError),
    Chunks(Vec<Vec<u8>>),
    /// Hands out the chunks, then fails
    Broken(Vec<Vec<u8>>, TransportError),
}

type ChunkHook = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// Scripted [`Transport`]. Routes are keyed by [`ApiRequest::target`];
/// unknown targets answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
    hook: Mutex<Option<ChunkHook>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, target: &str, reply: Reply) -> &Self {
        self.routes.lock().unwrap().insert(target.to_string(), reply);
        self
    }

    pub fn json(&self, target: &str, body: serde_json::Value) -> &Self {
        self.reply(target, Reply::Body(body.to_string().into_bytes()))
    }

    pub fn fail(&self, target: &str, err: TransportError) -> &Self {
        self.reply(target, Reply::Fail(err))
    }

    pub fn chunks(&self, target: &str, chunks: Vec<Vec<u8>>) -> &Self {
        self.reply(target, Reply::Chunks(chunks))
    }

    /// Called as `hook(target, index)` right before chunk `index` is handed out.
    pub fn on_chunk<F>(&self, hook: F)
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        *self.hook.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<String> {
        self.requests().iter().map(ApiRequest::target).collect()
    }

    fn lookup(&self, request: &ApiRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        self.routes
            .lock()
            .unwrap()
            .get(&request.target())
            .cloned()
            .unwrap_or(Reply::Fail(TransportError::Status(404)))
    }
}

impl Transport for FakeTransport {
    fn get(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
        match self.lookup(request) {
            Reply::Body(body) => Ok(body),
            Reply::Fail(err) | Reply::Broken(_, err) => Err(err),
            Reply::Chunks(chunks) => Ok(chunks.concat()),
        }
    }

    fn open<'a>(
        &'a self,
        request: &ApiRequest,
    ) -> Result<Box<dyn ChunkStream + 'a>, TransportError> {
        let (chunks, tail) = match self.lookup(request) {
            Reply::Body(body) => (vec![body], None),
            Reply::Fail(err) => return Err(err),
            Reply::Chunks(chunks) => (chunks, None),
            Reply::Broken(chunks, err) => (chunks, Some(err)),
        };
        Ok(Box::new(FakeStream {
            target: request.target(),
            chunks: chunks.into(),
            tail,
            index: 0,
            hook: self.hook.lock().unwrap().clone(),
        }))
    }
}

struct FakeStream {
    target: String,
    chunks: VecDeque<Vec<u8>>,
    tail: Option<TransportError>,
    index: usize,
    hook: Option<ChunkHook>,
}

impl ChunkStream for FakeStream {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(chunk) = self.chunks.pop_front() else {
            return match self.tail.take() {
                Some(err) => Err(err),
                None => Ok(None),
            };
        };
        if let Some(hook) = &self.hook {
            hook(&self.target, self.index);
        }
        self.index += 1;
        Ok(Some(chunk))
    }
}

/// Context rooted in `root`: ROMs under `root/roms`, resources under `root/resources`.
pub fn context(root: &Path, profile: DeviceProfile, config: SyncConfig) -> SyncContext {
    let mut config = config;
    config.server.host = HOST.to_string();
    config.device.profile = Some(profile);
    let resolver = FolderResolver::new(profile, config.device.custom_maps.clone());
    let storage = StorageLayout::new(root.join("roms"), None, 1, root.join("resources"));
    SyncContext::from_parts(config, resolver, storage)
}

pub fn title(id: u64, name: &str, slug: &str, storage_name: &str, size_bytes: u64) -> Title {
    Title {
        id,
        name: name.to_string(),
        storage_name: storage_name.to_string(),
        platform_slug: slug.to_string(),
        extension: storage_name.rsplit('.').next().unwrap_or_default().to_string(),
        size_bytes,
        human_size: rommsync_shared::format_size(size_bytes),
        is_multi_file: false,
        languages: vec![],
        regions: vec![],
        revision: None,
        tags: vec![],
    }
}

pub fn rom_json(id: u64, name: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "fs_name": format!("{}.bin", name),
        "platform_slug": slug,
        "fs_extension": "bin",
        "fs_size_bytes": 1024,
        "multi": false,
        "languages": [],
        "regions": [],
        "revision": null,
        "tags": []
    })
}

pub fn platform_json(id: u64, slug: &str, rom_count: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "display_name": slug.to_uppercase(),
        "slug": slug,
        "rom_count": rom_count
    })
}
