use bytes::{Buf, BytesMut};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, WriterError};
use crate::metrics::StreamMetrics;
use crate::models::{FrameAction, StreamFrame};

const DATA_PREFIX: &str = "data:";

/// Extract the payload of a `data:` line.
///
/// Returns `None` for lines that are not frames, including `data:` lines whose
/// payload is empty after trimming.
pub fn frame_payload(line: &str) -> Option<&str> {
    let payload = line.trim().strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

/// Stateful splitter that turns arbitrarily sized transport chunks into
/// newline-delimited frames.
///
/// Once the `[DONE]` sentinel has been seen nothing else is emitted, whatever
/// is left in the pending buffer or arrives afterwards.
#[derive(Debug, Default)]
pub struct StreamReassembler {
    /// Text after the last newline seen so far
    pending: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    undecoded: BytesMut,
    finished: bool,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next text chunk and collect every frame it completes
    pub fn feed(&mut self, chunk: &str) -> Vec<StreamFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }

        self.pending.push_str(chunk);
        let Some(last_newline) = self.pending.rfind('\n') else {
            return frames;
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        for line in complete[..last_newline].split('\n') {
            let Some(payload) = frame_payload(line) else {
                continue;
            };

            let frame = StreamFrame::from_payload(payload);
            if frame == StreamFrame::Done {
                self.mark_finished();
                frames.push(frame);
                return frames;
            }
            frames.push(frame);
        }

        frames
    }

    /// Feed raw transport bytes.
    ///
    /// A multi-byte character split across chunks is held back until its
    /// remaining bytes arrive; invalid sequences become U+FFFD.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        if self.finished {
            return Vec::new();
        }

        self.undecoded.extend_from_slice(chunk);
        let text = self.decode_available();
        self.feed(&text)
    }

    fn decode_available(&mut self) -> String {
        let mut text = String::new();

        loop {
            match std::str::from_utf8(&self.undecoded) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.undecoded.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    text.push_str(
                        std::str::from_utf8(&self.undecoded[..valid_up_to]).unwrap_or_default(),
                    );

                    match e.error_len() {
                        Some(invalid_len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.undecoded.advance(valid_up_to + invalid_len);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.undecoded.advance(valid_up_to);
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Evaluate whatever is left once the transport reports completion.
    ///
    /// Handles a last frame that arrived without a trailing newline. The
    /// pending buffer is discarded afterwards.
    pub fn finish(&mut self) -> Option<StreamFrame> {
        if !self.undecoded.is_empty() {
            let tail = String::from_utf8_lossy(&self.undecoded).into_owned();
            self.undecoded.clear();
            self.pending.push_str(&tail);
        }

        let tail = std::mem::take(&mut self.pending);
        if self.finished {
            return None;
        }

        let frame = StreamFrame::from_payload(frame_payload(&tail)?);
        if frame == StreamFrame::Done {
            self.finished = true;
        }
        Some(frame)
    }

    /// Whether the `[DONE]` sentinel has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reset the reassembler for a new stream
    pub fn reset(&mut self) {
        self.pending.clear();
        self.undecoded.clear();
        if self.undecoded.capacity() > 65536 {
            self.undecoded = BytesMut::new();
        }
        self.finished = false;
    }

    fn mark_finished(&mut self) {
        self.finished = true;
        self.pending.clear();
        self.undecoded.clear();
    }
}

/// Whether more frames may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Open,
    /// `[DONE]` was received
    Finished,
}

/// Applies reassembled frames to the accumulated text buffer.
///
/// The buffer only ever grows by appending non-empty `content` deltas, in
/// frame order. Malformed frames are logged and skipped; an `error` frame is
/// returned as [`WriterError::GenerationError`].
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    reassembler: StreamReassembler,
    text: String,
    metrics: Option<Arc<StreamMetrics>>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<StreamMetrics>) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::default()
        }
    }

    pub fn push_str(&mut self, chunk: &str) -> Result<StreamStatus> {
        self.record_chunk(chunk.len());
        let frames = self.reassembler.feed(chunk);
        self.apply(frames)
    }

    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<StreamStatus> {
        self.record_chunk(chunk.len());
        let frames = self.reassembler.feed_bytes(chunk);
        self.apply(frames)
    }

    /// Transport is exhausted: process a trailing frame, if any.
    ///
    /// Running out of chunks without `[DONE]` is still a normal close.
    pub fn close(&mut self) -> Result<StreamStatus> {
        let frames: Vec<_> = self.reassembler.finish().into_iter().collect();
        self.apply(frames)?;
        Ok(StreamStatus::Finished)
    }

    /// Everything accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_finished(&self) -> bool {
        self.reassembler.is_finished()
    }

    fn apply(&mut self, frames: Vec<StreamFrame>) -> Result<StreamStatus> {
        for frame in frames {
            let payload = match frame {
                StreamFrame::Done => {
                    debug!(len = self.text.len(), "Stream finished");
                    return Ok(StreamStatus::Finished);
                }
                StreamFrame::Payload(payload) => payload,
            };

            if let Some(metrics) = &self.metrics {
                metrics.record_frame();
            }

            match FrameAction::decode(&payload) {
                FrameAction::Append(delta) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_delta(delta.len());
                    }
                    self.text.push_str(&delta);
                }
                FrameAction::Fail(message) => {
                    return Err(WriterError::GenerationError(message));
                }
                FrameAction::Ignore => {
                    debug!("Ignoring frame without content or error");
                }
                FrameAction::Malformed(reason) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_malformed();
                    }
                    warn!(%reason, payload = %payload, "Skipping malformed frame");
                }
            }
        }

        Ok(if self.reassembler.is_finished() {
            StreamStatus::Finished
        } else {
            StreamStatus::Open
        })
    }

    fn record_chunk(&self, len: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_chunk(len);
        }
    }
}
