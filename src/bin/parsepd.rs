//! CLI binary for parsepd.
//!
//! A thin shim over the library crate: reads an extracted-text file, runs
//! the guard → classify → extract → validate pipeline against a configured
//! OpenAI-compatible backend, and prints (or writes) the openEPD record.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parsepd::convert::PlainTextConverter;
use parsepd::pipeline::RecordStatus;
use parsepd::report::{download_bytes, render_record, validity_banner};
use parsepd::{
    EpdPipeline, LlmConfig, MediaType, OpenAiChatClient, SessionState,
    DEFAULT_REDACTION_THRESHOLD,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

#[derive(Parser)]
#[command(name = "parsepd", version, about = "Digitize an EPD document into an openEPD JSON record")]
struct Cli {
    /// Path to a UTF-8 text file with the extracted document content.
    input: PathBuf,

    /// Write the extracted record to this file instead of stdout.
    #[arg(short, long, env = "PARSEPD_OUTPUT")]
    output: Option<PathBuf>,

    /// Chat completion endpoint base URL (up to /v1).
    #[arg(long, env = "PARSEPD_BASE_URL")]
    base_url: Option<String>,

    /// API key for the backend; omit for local servers.
    #[arg(long, env = "PARSEPD_API_KEY")]
    api_key: Option<String>,

    /// Model identifier (e.g. gpt-4o-mini).
    #[arg(long, env = "PARSEPD_MODEL")]
    model: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "PARSEPD_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Injection score at which document lines are redacted.
    #[arg(long, default_value_t = DEFAULT_REDACTION_THRESHOLD)]
    threshold: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PARSEPD_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "{} starting v{}",
        parsepd::config::APP_NAME,
        parsepd::config::APP_VERSION
    );

    let mut config = LlmConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let media_type = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(MediaType::from_file_name)
        .unwrap_or(MediaType::Pdf);
    let chat = OpenAiChatClient::from_config(&config);
    let pipeline = EpdPipeline::new(Box::new(chat))
        .context("schema compilation failed")?
        .with_redaction_threshold(cli.threshold);

    let mut session = SessionState::new();
    let (_document, outcome) = pipeline
        .process_upload(&mut session, &PlainTextConverter, &bytes, media_type)
        .context("pipeline failed")?;

    if outcome.guard.is_suspicious {
        eprintln!(
            "{} injection screening: score {} ({} matches)",
            yellow("⚠"),
            outcome.guard.score,
            outcome.guard.match_count
        );
    }

    println!("{}", bold("Classification"));
    println!("{}", outcome.verdict.raw_reply.trim());

    let Some(extraction) = outcome.extraction else {
        println!("\n{} document rejected, nothing to extract", red("✗"));
        std::process::exit(1);
    };

    match extraction.record {
        RecordStatus::Parsed { record, schema } => {
            let banner = validity_banner(&schema);
            if schema.valid {
                println!("\n{} openEPD schema: {}", green("✓"), banner);
            } else {
                println!("\n{} openEPD schema: {}", red("✗"), banner);
            }
            match cli.output {
                Some(path) => {
                    std::fs::write(&path, download_bytes(&record))
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    println!("{} record written to {}", green("✓"), path.display());
                }
                None => println!("\n{}", render_record(&record)),
            }
        }
        RecordStatus::Unparsable { reason } => {
            println!("\n{} no JSON record recovered: {reason}", red("✗"));
            println!("\n{}", bold("Raw model reply"));
            println!("{}", extraction.raw_reply.trim());
            std::process::exit(1);
        }
    }

    Ok(())
}
