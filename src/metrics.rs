use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for one or more generation streams
///
/// Thread-safe atomic counters, shared between the stream loop and callers.
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Transport chunks received
    pub chunks: AtomicU64,

    /// Raw bytes received
    pub bytes: AtomicU64,

    /// Non-sentinel frames decoded
    pub frames: AtomicU64,

    /// Frames skipped because the payload was not JSON
    pub malformed_frames: AtomicU64,

    /// Content deltas appended to the buffer
    pub content_deltas: AtomicU64,

    /// Bytes of content appended to the buffer
    pub content_bytes: AtomicU64,

    /// Section parses run
    pub parses: AtomicU64,

    /// Total parse time in microseconds
    pub total_parse_time_us: AtomicU64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chunk(&self, len: usize) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delta(&self, len: usize) {
        self.content_deltas.fetch_add(1, Ordering::Relaxed);
        self.content_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Record one section parse and how long it took
    pub fn record_parse(&self, duration: Duration) {
        self.parses.fetch_add(1, Ordering::Relaxed);
        self.total_parse_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get average parse time in microseconds
    pub fn avg_parse_time_us(&self) -> u64 {
        let total = self.total_parse_time_us.load(Ordering::Relaxed);
        let count = self.parses.load(Ordering::Relaxed);
        if count > 0 { total / count } else { 0 }
    }

    /// Get snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks: self.chunks.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            content_deltas: self.content_deltas.load(Ordering::Relaxed),
            content_bytes: self.content_bytes.load(Ordering::Relaxed),
            parses: self.parses.load(Ordering::Relaxed),
            avg_parse_time_us: self.avg_parse_time_us(),
        }
    }

    /// Reset all metrics (useful for testing)
    pub fn reset(&self) {
        self.chunks.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
        self.frames.store(0, Ordering::Relaxed);
        self.malformed_frames.store(0, Ordering::Relaxed);
        self.content_deltas.store(0, Ordering::Relaxed);
        self.content_bytes.store(0, Ordering::Relaxed);
        self.parses.store(0, Ordering::Relaxed);
        self.total_parse_time_us.store(0, Ordering::Relaxed);
    }
}

/// Immutable snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub chunks: u64,
    pub bytes: u64,
    pub frames: u64,
    pub malformed_frames: u64,
    pub content_deltas: u64,
    pub content_bytes: u64,
    pub parses: u64,
    pub avg_parse_time_us: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stream Metrics: {} chunks ({} bytes), {} frames ({} malformed), {} deltas, {} parses, avg {:.2}ms",
            self.chunks,
            self.bytes,
            self.frames,
            self.malformed_frames,
            self.content_deltas,
            self.parses,
            self.avg_parse_time_us as f64 / 1000.0
        )
    }
}
