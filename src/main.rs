use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xhs_note_writer::client::HttpBackend;
use xhs_note_writer::models::GenerateRequest;
use xhs_note_writer::notice::ErrorNotice;
use xhs_note_writer::provider::{GenerationBackend, ReplayBackend};
use xhs_note_writer::{Generator, StructuredContent, WriterConfig, WriterError};

#[derive(Parser, Debug)]
#[command(name = "xhs-writer", version, about = "Generate Xiaohongshu-style notes from a streaming backend")]
struct Cli {
    /// Path to a TOML config file (defaults to WRITER_* environment variables)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print the parsed content as JSON instead of copy text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream a new note from the backend
    Generate {
        /// Core topic of the note
        #[arg(long)]
        keyword: String,

        /// Reference material: tone, details, selling points or a draft
        #[arg(long)]
        material: String,
    },
    /// Parse a base64 pre-rendered document
    Decode {
        #[arg(long)]
        data: String,
    },
    /// Replay a recorded response body through the streaming pipeline
    Replay {
        /// File holding the raw `data:` lines
        #[arg(long)]
        file: String,

        #[arg(long, default_value_t = 64)]
        chunk_size: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WriterConfig::from_file(path)?,
        None => WriterConfig::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Command::Generate { keyword, material } => {
            let backend = HttpBackend::new(config.backend.clone())?;
            info!("Backend endpoint: {}", backend.endpoint_url());
            let request = match GenerateRequest::new(&keyword, &material) {
                Ok(request) => request,
                Err(e) => return Err(report(e)),
            };
            run(Arc::new(backend), &config, request, cli.json).await
        }
        Command::Replay { file, chunk_size } => {
            let body = std::fs::read(&file).with_context(|| format!("reading {}", file))?;
            let backend = ReplayBackend::from_body(body, chunk_size);
            let request = GenerateRequest::new("replay", file.as_str())?;
            run(Arc::new(backend), &config, request, cli.json).await
        }
        Command::Decode { data } => {
            let generator = Generator::new(Arc::new(ReplayBackend::new(Vec::new())), &config);
            let content = generator.load_document(&data)?;
            print_content(&content, &generator.snapshot().raw_text, cli.json)
        }
    }
}

async fn run(
    backend: Arc<dyn GenerationBackend>,
    config: &WriterConfig,
    request: GenerateRequest,
    json: bool,
) -> anyhow::Result<()> {
    let generator = Generator::new(backend, config);
    let handle = generator.start(request)?;

    let result = tokio::select! {
        result = handle.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, cancelling generation");
            generator.shutdown();
            return Ok(());
        }
    };

    match result {
        Ok(content) => print_content(&content, &generator.snapshot().raw_text, json),
        Err(e) => Err(report(e)),
    }
}

fn print_content(content: &StructuredContent, raw: &str, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(content)?);
    } else {
        println!("{}", content.to_copy_text(raw));
    }
    Ok(())
}

fn report(err: WriterError) -> anyhow::Error {
    if let Some(notice) = ErrorNotice::from_error(&err) {
        eprintln!("{}", notice);
    }
    anyhow::Error::new(err)
}
