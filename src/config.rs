use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::chunk::{ChunkParams, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub wiki: WikiConfig,
    #[serde(default)]
    pub knowledge_store: KnowledgeStoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Resolved by [`load_config`], never read from the file directly.
    #[serde(skip)]
    chunk_params: ChunkParams,
}

impl Config {
    /// Validated chunking parameters resolved at load time.
    pub fn chunk_params(&self) -> &ChunkParams {
        &self.chunk_params
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WikiConfig {
    /// Base URL of the wiki instance. Normalized to end with `/` at load.
    pub base_url: String,
    pub token_id: String,
    pub token_secret: String,
    /// Allow-list of book ids whose pages are synchronized. Read-only
    /// after startup.
    pub monitored_books: Vec<i64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeStoreConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub knowledge_base: Option<String>,
}

impl KnowledgeStoreConfig {
    /// The stub sink downgrades to a logged no-op unless all three
    /// credentials are present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some() && self.knowledge_base.is_some()
    }
}

/// Raw chunking section. Values are kept as `toml::Value` so that a
/// non-integer entry falls back to the documented default with a warning
/// instead of failing the whole config parse; an integer pair that violates
/// `overlap < size` is still a fatal error.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChunkingConfig {
    #[serde(default)]
    pub chunk_size: Option<toml::Value>,
    #[serde(default)]
    pub chunk_overlap: Option<toml::Value>,
}

impl ChunkingConfig {
    pub fn resolve(&self) -> Result<ChunkParams> {
        let size = coerce_field("chunking.chunk_size", &self.chunk_size, DEFAULT_CHUNK_SIZE);
        let overlap = coerce_field(
            "chunking.chunk_overlap",
            &self.chunk_overlap,
            DEFAULT_CHUNK_OVERLAP,
        );
        ChunkParams::new(size, overlap)
    }
}

fn coerce_field(name: &str, value: &Option<toml::Value>, default: usize) -> usize {
    match value {
        None => default,
        Some(toml::Value::Integer(n)) if *n >= 0 => *n as usize,
        Some(other) => {
            tracing::warn!(
                field = name,
                value = %other,
                default,
                "invalid chunking value, falling back to default"
            );
            default
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;

    // Validate server
    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    // Validate wiki
    if config.wiki.base_url.is_empty() {
        anyhow::bail!("wiki.base_url must not be empty");
    }
    if !config.wiki.base_url.ends_with('/') {
        config.wiki.base_url.push('/');
    }
    if config.wiki.token_id.is_empty() || config.wiki.token_secret.is_empty() {
        anyhow::bail!("wiki.token_id and wiki.token_secret must not be empty");
    }
    if config.wiki.monitored_books.is_empty() {
        anyhow::bail!("wiki.monitored_books must list at least one book id");
    }

    // Validate chunking (fatal on overlap >= size, fallback on bad types)
    config.chunk_params = config.chunking.resolve()?;

    Ok(config)
}
