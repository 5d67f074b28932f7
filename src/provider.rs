use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::{Result, WriterError};
use crate::models::GenerateRequest;

/// Type alias for the streaming response body of a backend
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Type alias for the future returned by stream_generate
pub type StreamFuture = Pin<Box<dyn Future<Output = Result<ChunkStream>> + Send>>;

/// Trait for generation backends that stream `data:` lines
pub trait GenerationBackend: Send + Sync {
    /// Send the request and return the raw response body as a chunk stream
    ///
    /// # Arguments
    /// * `request` - Validated topic and reference material
    ///
    /// # Returns
    /// Ordered chunks of the response body; chunk boundaries are arbitrary
    fn stream_generate(&self, request: &GenerateRequest) -> StreamFuture;

    /// Get the backend name for logging
    fn name(&self) -> &str;
}

/// Backend that replays a recorded response body.
///
/// Useful for demos and tests: the body is cut into fixed-size byte chunks
/// (which may split lines and characters) and optionally paced.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    chunks: Vec<Bytes>,
    delay: Option<Duration>,
}

impl ReplayBackend {
    pub fn new(chunks: Vec<Bytes>) -> Self {
        Self {
            chunks,
            delay: None,
        }
    }

    /// Split `body` into chunks of at most `chunk_size` bytes
    pub fn from_body(body: impl Into<Bytes>, chunk_size: usize) -> Self {
        let body: Bytes = body.into();
        let chunk_size = chunk_size.max(1);
        let chunks = (0..body.len())
            .step_by(chunk_size)
            .map(|start| body.slice(start..(start + chunk_size).min(body.len())))
            .collect();
        Self::new(chunks)
    }

    /// Wait `delay` before each chunk
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }
}

impl GenerationBackend for ReplayBackend {
    fn stream_generate(&self, _request: &GenerateRequest) -> StreamFuture {
        let chunks = self.chunks.clone();
        let delay = self.delay;

        Box::pin(async move {
            let stream = futures::stream::iter(chunks).then(move |chunk| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok::<Bytes, WriterError>(chunk)
            });
            Ok(Box::pin(stream) as ChunkStream)
        })
    }

    fn name(&self) -> &str {
        "Replay"
    }
}
