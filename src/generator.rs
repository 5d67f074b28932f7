use arc_swap::ArcSwap;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::WriterConfig;
use crate::error::{Result, WriterError};
use crate::legacy::decode_document;
use crate::metrics::StreamMetrics;
use crate::models::{GenerateRequest, StructuredContent};
use crate::notice::ErrorNotice;
use crate::provider::GenerationBackend;
use crate::session::{AttemptContext, AttemptRegistry};
use crate::streaming::{Debouncer, SectionParser, StreamAccumulator, StreamStatus};

/// Progress of a generation attempt, in the order they are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationStage {
    #[default]
    Preparing,
    FetchingData,
    AnalyzingTrends,
    GeneratingContent,
    Finished,
}

/// The published view of the current attempt.
///
/// Replaced wholesale on every change; readers never observe a partial update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSnapshot {
    pub attempt_id: u64,
    pub stage: GenerationStage,
    pub loading: bool,
    /// Accumulated text as of the last parse
    pub raw_text: String,
    pub content: StructuredContent,
    pub error: Option<ErrorNotice>,
}

/// Writes snapshot changes on behalf of one attempt.
///
/// Every write is a compare-and-swap that is dropped when the published
/// snapshot belongs to another attempt or this attempt is no longer current.
struct SnapshotPublisher {
    view: Arc<ArcSwap<GenerationSnapshot>>,
    attempt: AttemptContext,
}

impl SnapshotPublisher {
    fn update(&self, mut f: impl FnMut(&mut GenerationSnapshot)) -> bool {
        let mut applied = false;
        self.view.rcu(|current| {
            if current.attempt_id != self.attempt.id() || !self.attempt.is_current() {
                applied = false;
                return Arc::clone(current);
            }
            let mut next = (**current).clone();
            f(&mut next);
            applied = true;
            Arc::new(next)
        });

        if !applied {
            debug!(attempt_id = self.attempt.id(), "Dropped update from stale attempt");
        }
        applied
    }

    fn stage(&self, stage: GenerationStage) {
        self.update(|s| s.stage = stage);
    }
}

/// Handle to a running attempt
#[derive(Debug)]
pub struct GenerationHandle {
    attempt_id: u64,
    task: JoinHandle<Result<StructuredContent>>,
}

impl GenerationHandle {
    pub fn attempt_id(&self) -> u64 {
        self.attempt_id
    }

    /// Wait for the attempt to finish.
    ///
    /// A superseded attempt resolves to [`WriterError::Cancelled`].
    pub async fn wait(self) -> Result<StructuredContent> {
        self.task
            .await
            .map_err(|e| WriterError::InternalError(format!("generation task failed: {}", e)))?
    }
}

/// Drives generation attempts and publishes their parsed output
pub struct Generator {
    backend: Arc<dyn GenerationBackend>,
    parser: SectionParser,
    debounce: Duration,
    attempts: Arc<AttemptRegistry>,
    view: Arc<ArcSwap<GenerationSnapshot>>,
    /// Counters of the most recent attempt
    metrics: ArcSwap<StreamMetrics>,
}

impl Generator {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: &WriterConfig) -> Self {
        Self {
            backend,
            parser: SectionParser::new(),
            debounce: config.stream.debounce(),
            attempts: Arc::new(AttemptRegistry::new()),
            view: Arc::new(ArcSwap::from_pointee(GenerationSnapshot::default())),
            metrics: ArcSwap::from_pointee(StreamMetrics::new()),
        }
    }

    /// Use a custom section parser
    pub fn with_parser(mut self, parser: SectionParser) -> Self {
        self.parser = parser;
        self
    }

    /// Current snapshot (lock-free read)
    pub fn snapshot(&self) -> Arc<GenerationSnapshot> {
        self.view.load_full()
    }

    /// Counters of the most recently started attempt
    pub fn metrics(&self) -> Arc<StreamMetrics> {
        self.metrics.load_full()
    }

    /// Start a new attempt, superseding any attempt still in flight.
    ///
    /// Must be called from within a tokio runtime. Invalid input is rejected
    /// before anything is sent and leaves the current snapshot untouched.
    pub fn start(&self, request: GenerateRequest) -> Result<GenerationHandle> {
        request.validate()?;

        let attempt = self.attempts.begin();
        let attempt_id = attempt.id();
        let metrics = Arc::new(StreamMetrics::new());
        self.metrics.store(metrics.clone());
        self.publish_fresh(GenerationSnapshot {
            attempt_id,
            stage: GenerationStage::Preparing,
            loading: true,
            ..Default::default()
        });

        info!(
            attempt_id,
            backend = self.backend.name(),
            keyword = %request.keyword,
            "Starting generation"
        );

        let run = AttemptRun {
            publisher: SnapshotPublisher {
                view: self.view.clone(),
                attempt: attempt.clone(),
            },
            attempt,
            backend: self.backend.clone(),
            parser: self.parser.clone(),
            debounce: self.debounce,
            metrics,
        };

        let task = tokio::spawn(run.execute(request));
        Ok(GenerationHandle { attempt_id, task })
    }

    /// Parse a pre-rendered document once, without streaming.
    ///
    /// Supersedes any attempt in flight.
    pub fn load_document(&self, encoded: &str) -> Result<StructuredContent> {
        let text = decode_document(encoded)?;
        let attempt = self.attempts.begin();

        let metrics = Arc::new(StreamMetrics::new());
        self.metrics.store(metrics.clone());

        let started = std::time::Instant::now();
        let content = self.parser.parse(&text);
        metrics.record_parse(started.elapsed());

        info!(attempt_id = attempt.id(), len = text.len(), "Loaded document");

        self.publish_fresh(GenerationSnapshot {
            attempt_id: attempt.id(),
            stage: GenerationStage::Finished,
            loading: false,
            raw_text: text,
            content: content.clone(),
            error: None,
        });

        Ok(content)
    }

    /// Invalidate the current attempt and release its transport
    pub fn shutdown(&self) {
        self.attempts.invalidate();
        self.view.rcu(|current| {
            let mut next = (**current).clone();
            next.loading = false;
            next
        });
    }

    /// Replace the snapshot unless a newer attempt already published one
    fn publish_fresh(&self, snapshot: GenerationSnapshot) {
        self.view.rcu(|current| {
            if current.attempt_id > snapshot.attempt_id {
                Arc::clone(current)
            } else {
                Arc::new(snapshot.clone())
            }
        });
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        self.attempts.invalidate();
    }
}

/// Everything one attempt's task owns
struct AttemptRun {
    attempt: AttemptContext,
    publisher: SnapshotPublisher,
    backend: Arc<dyn GenerationBackend>,
    parser: SectionParser,
    debounce: Duration,
    metrics: Arc<StreamMetrics>,
}

impl AttemptRun {
    async fn execute(self, request: GenerateRequest) -> Result<StructuredContent> {
        let attempt_id = self.attempt.id();
        let result = self.stream(&request).await;

        match &result {
            Ok(content) => {
                self.publisher.update(|s| {
                    s.stage = GenerationStage::Finished;
                    s.loading = false;
                });
                info!(
                    attempt_id,
                    tags = content.tags.len(),
                    "Generation finished"
                );
            }
            Err(e) if e.is_cancelled() => {
                debug!(attempt_id, "Generation superseded");
            }
            Err(e) => {
                error!(attempt_id, "Generation failed: {}", e);
                let notice = ErrorNotice::from_error(e);
                self.publisher.update(|s| {
                    s.loading = false;
                    s.error = notice.clone();
                });
            }
        }

        info!(attempt_id, "{}", self.metrics.snapshot());
        result
    }

    async fn stream(&self, request: &GenerateRequest) -> Result<StructuredContent> {
        let attempt_id = self.attempt.id();

        self.publisher.stage(GenerationStage::FetchingData);
        self.publisher.stage(GenerationStage::AnalyzingTrends);

        let mut stream = tokio::select! {
            biased;
            _ = self.attempt.cancelled() => return Err(WriterError::Cancelled(attempt_id)),
            stream = self.backend.stream_generate(request) => stream?,
        };

        self.publisher.stage(GenerationStage::GeneratingContent);

        let mut acc = StreamAccumulator::with_metrics(self.metrics.clone());
        let mut debouncer = Debouncer::new(self.debounce);

        loop {
            let deadline = debouncer.deadline();

            tokio::select! {
                biased;
                _ = self.attempt.cancelled() => {
                    // Dropping the stream here releases the connection
                    return Err(WriterError::Cancelled(attempt_id));
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debouncer.fire(Instant::now()) {
                        self.parse_and_publish(acc.text());
                    }
                }
                next = stream.next() => {
                    let Some(chunk) = next else {
                        let before = acc.text().len();
                        acc.close()?;
                        if acc.text().len() != before {
                            debouncer.touch(Instant::now());
                        }
                        debug!(attempt_id, "Stream closed without sentinel");
                        break;
                    };

                    let before = acc.text().len();
                    let status = acc.push_bytes(&chunk?)?;
                    if acc.text().len() != before {
                        debouncer.touch(Instant::now());
                    }
                    if status == StreamStatus::Finished {
                        break;
                    }
                }
            }
        }

        drop(stream);

        if !self.attempt.is_current() {
            return Err(WriterError::Cancelled(attempt_id));
        }

        // The final parse always runs on the complete buffer
        debouncer.flush();
        Ok(self.parse_and_publish(acc.text()))
    }

    fn parse_and_publish(&self, text: &str) -> StructuredContent {
        let started = std::time::Instant::now();
        let content = self.parser.parse(text);
        self.metrics.record_parse(started.elapsed());

        debug!(
            attempt_id = self.attempt.id(),
            len = text.len(),
            "Re-parsed buffer"
        );

        self.publisher.update(|s| {
            s.raw_text = text.to_string();
            s.content = content.clone();
        });
        content
    }
}
