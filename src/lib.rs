//! # XHS Note Writer
//!
//! Streaming client for a Xiaohongshu-style note generation service.
//!
//! ## Overview
//!
//! The backend answers a topic and some reference material with a
//! line-delimited `data:` event stream. This library:
//! - Reassembles the stream from arbitrarily split network chunks
//! - Re-parses the growing markdown into a [`StructuredContent`] record
//!   (titles, body, tags, image prompt, first comment, strategy, playbook)
//! - Publishes progress snapshots while guarding against stale attempts
//! - Decodes pre-rendered documents handed over as base64
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xhs_note_writer::{Generator, WriterConfig};
//! use xhs_note_writer::client::HttpBackend;
//! use xhs_note_writer::models::GenerateRequest;
//!
//! # async fn run() -> xhs_note_writer::Result<()> {
//! let config = WriterConfig::from_env()?;
//! let backend = HttpBackend::new(config.backend.clone())?;
//! let generator = Generator::new(Arc::new(backend), &config);
//!
//! let request = GenerateRequest::new("秋季穿搭", "温柔的语气，学生党平价")?;
//! let content = generator.start(request)?.wait().await?;
//! println!("{}", content.to_copy_text(""));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`models`] - Request, frame and parsed content types
//! - [`streaming`] - Stream reassembly, section parsing and tag extraction
//! - [`generator`] - Attempt lifecycle and snapshot publishing
//! - [`client`] - HTTP backend

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod legacy;
pub mod metrics;
pub mod models;
pub mod notice;
pub mod provider;
pub mod session;
pub mod streaming;

pub use config::WriterConfig;
pub use error::{Result, WriterError};
pub use generator::{GenerationHandle, GenerationSnapshot, GenerationStage, Generator};
pub use models::StructuredContent;
pub use streaming::parse_sections;
