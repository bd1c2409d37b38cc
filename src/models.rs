//! Core data models used throughout wikisync.
//!
//! These types represent the documents and chunks that flow from the wiki
//! platform, through the chunker, and into the knowledge-store sink.

use serde::Serialize;

/// A wiki page fetched for processing. Transient — built per webhook
/// notification and discarded once its chunks have been handed to the sink.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub body: String,
}

/// Metadata attached to every chunk of a document, consumed by the
/// knowledge store for source attribution.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkMetadata {
    /// Source label, e.g. `"BookStack Page ID: 42"`.
    pub source: String,
    /// The page's display name.
    pub title: String,
    /// Origin URL of the page on the wiki.
    pub url: String,
}

impl ChunkMetadata {
    /// Builds the metadata block for a wiki page. `wiki_base_url` must end
    /// with a trailing slash (guaranteed by config normalization).
    pub fn for_page(wiki_base_url: &str, page_id: i64, page_name: &str) -> Self {
        Self {
            source: format!("BookStack Page ID: {}", page_id),
            title: page_name.to_string(),
            url: format!("{}view/{}", wiki_base_url, page_id),
        }
    }
}

/// A bounded segment of a document's body text.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: i64,
    pub chunk_index: i64,
    pub text: String,
    /// SHA-256 of `text`, for staleness detection on the store side.
    pub hash: String,
    pub metadata: ChunkMetadata,
}
