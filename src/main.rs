//! # wikisync CLI
//!
//! The `wikisync` binary runs the webhook server and provides small
//! offline helpers for working with a configuration.
//!
//! ## Usage
//!
//! ```bash
//! wikisync --config ./config/wikisync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wikisync serve` | Start the webhook server |
//! | `wikisync chunk <file>` | Split a local file with the configured parameters |
//! | `wikisync check` | Validate the configuration and print a summary |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wikisync::chunk::split_text;
use wikisync::config::{load_config, Config};
use wikisync::server::run_server;

/// wikisync CLI — a webhook-driven wiki-to-RAG content synchronization
/// bridge.
#[derive(Parser)]
#[command(
    name = "wikisync",
    about = "wikisync — sync BookStack page changes into a RAG knowledge store",
    version,
    long_about = "wikisync receives BookStack page webhooks, fetches changed page content, \
    splits it into bounded overlapping chunks, and forwards the chunks to a \
    retrieval-augmented-generation knowledge store."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/wikisync.toml`. Server, wiki, knowledge-store,
    /// and chunking settings are read from this file.
    #[arg(long, global = true, default_value = "./config/wikisync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server.
    ///
    /// Binds to `[server].bind` and serves `POST /webhook/bookstack`,
    /// `GET /`, and `GET /health` until the process is terminated.
    Serve,

    /// Split a local file with the configured chunking parameters.
    ///
    /// Reads the file, runs the separator-cascade splitter, and prints
    /// per-chunk sizes and previews. Useful for tuning `chunk_size` and
    /// `chunk_overlap` without touching the network.
    Chunk {
        /// Path to the text or Markdown file to split.
        file: PathBuf,
    },

    /// Validate the configuration and print a summary.
    ///
    /// Checks that the configuration parses and that the chunking contract
    /// holds, then prints the bind address, monitored books, chunking
    /// parameters, and knowledge-store readiness.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            run_server(&cfg).await?;
        }
        Commands::Chunk { file } => {
            run_chunk(&cfg, &file)?;
        }
        Commands::Check => {
            run_check(&cfg);
        }
    }

    Ok(())
}

/// Implements `wikisync chunk <file>`.
fn run_chunk(config: &Config, file: &PathBuf) -> anyhow::Result<()> {
    use anyhow::Context;

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let params = config.chunk_params();
    let chunks = split_text(&text, params);

    println!(
        "chunk {} (size={}, overlap={})",
        file.display(),
        params.max_chars(),
        params.overlap_chars()
    );
    println!("  input: {} chars", text.chars().count());
    println!("  chunks: {}", chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let preview: String = chunk.chars().take(60).collect();
        println!(
            "  [{}] {} chars  {:?}",
            i,
            chunk.chars().count(),
            preview.replace('\n', " ")
        );
    }

    Ok(())
}

/// Implements `wikisync check`.
fn run_check(config: &Config) {
    let params = config.chunk_params();

    println!("configuration ok");
    println!("  server.bind: {}", config.server.bind);
    println!("  wiki.base_url: {}", config.wiki.base_url);
    println!("  wiki.timeout_secs: {}", config.wiki.timeout_secs);
    println!(
        "  monitored books ({}): {:?}",
        config.wiki.monitored_books.len(),
        config.wiki.monitored_books
    );
    println!(
        "  chunking: size={} overlap={}",
        params.max_chars(),
        params.overlap_chars()
    );
    let store = if config.knowledge_store.is_configured() {
        "CONFIGURED"
    } else {
        "NOT CONFIGURED (ingestion will be skipped)"
    };
    println!("  knowledge store: {}", store);
}
