//! HTTP transport abstraction
//!
//! The catalog and transfer code talk to the server through [`Transport`]
//! so they stay synchronous and testable. [`HttpTransport`] is the real
//! implementation: a `reqwest` client driven by a private current-thread
//! tokio runtime, meant to be used from the single worker thread.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Size of the chunks handed out by [`ChunkStream::next_chunk`].
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built (bad URL, unsupported scheme)
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// DNS, connect, TLS, timeout or a dropped connection
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
}

/// Basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A validated request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: Url,
    /// `None` means no overall deadline (content downloads).
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Build a request for `path` under `host`.
    ///
    /// Fails with [`TransportError::InvalidTarget`] if the result does not
    /// parse or is not http(s).
    pub fn new(host: &str, path: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let raw = format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'));
        let url = Url::parse(&raw)
            .map_err(|e| TransportError::InvalidTarget(format!("{}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidTarget(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                raw
            )));
        }
        Ok(Self { url, timeout })
    }

    /// Append query parameters.
    pub fn with_query<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.url.query_pairs_mut().extend_pairs(pairs);
        self
    }

    /// Append a single, percent-encoded path segment.
    pub fn with_segment(mut self, segment: &str) -> Self {
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.push(segment);
        }
        self
    }

    /// Path plus query, e.g. `/api/roms?platform_id=1`. Handy for logs and routing.
    pub fn target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

/// Body of a streamed response, handed out in chunks.
pub trait ChunkStream {
    /// Next chunk of at most [`CHUNK_SIZE`] bytes, or `None` at end of body.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Blocking request interface used by the catalog and transfer code.
pub trait Transport: Send + Sync {
    /// Fetch a whole response body.
    fn get(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError>;

    /// Start a request and return its body as a chunk stream.
    fn open<'a>(
        &'a self,
        request: &ApiRequest,
    ) -> Result<Box<dyn ChunkStream + 'a>, TransportError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Build the runtime and client. Fails only on local setup problems.
    pub fn new(credentials: Option<Credentials>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(std::io::Error::other)?;
        Ok(Self {
            runtime,
            client,
            credentials,
        })
    }

    async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, TransportError> {
        let mut builder = self.client.get(request.url.clone());
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        tracing::debug!("GET {}", request.url);
        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
        self.runtime.block_on(async {
            let response = self.send(request).await?;
            let body = response.bytes().await.map_err(classify)?;
            Ok(body.to_vec())
        })
    }

    fn open<'a>(
        &'a self,
        request: &ApiRequest,
    ) -> Result<Box<dyn ChunkStream + 'a>, TransportError> {
        let response = self.runtime.block_on(self.send(request))?;
        Ok(Box::new(HttpChunkStream {
            runtime: &self.runtime,
            response,
            pending: Vec::new(),
            offset: 0,
        }))
    }
}

/// Re-slices network frames into fixed-size chunks.
struct HttpChunkStream<'a> {
    runtime: &'a tokio::runtime::Runtime,
    response: reqwest::Response,
    pending: Vec<u8>,
    offset: usize,
}

impl ChunkStream for HttpChunkStream<'_> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        while self.offset >= self.pending.len() {
            match self.runtime.block_on(self.response.chunk()).map_err(classify)? {
                Some(frame) => {
                    self.pending = frame.to_vec();
                    self.offset = 0;
                }
                None => return Ok(None),
            }
        }

        let end = (self.offset + CHUNK_SIZE).min(self.pending.len());
        let chunk = self.pending[self.offset..end].to_vec();
        self.offset = end;
        Ok(Some(chunk))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidTarget(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::Status(status.as_u16())
    } else {
        TransportError::Network(err.to_string())
    }
}
