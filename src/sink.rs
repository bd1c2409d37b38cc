//! Knowledge-store ingestion sink.
//!
//! [`KnowledgeSink`] is the pluggable seam between the sync pipeline and the
//! retrieval index. [`OpenWebUiSink`] is the current implementation: Open
//! WebUI exposes no stable public ingestion API, so the sink builds the
//! per-chunk payloads a real endpoint would receive and logs them instead of
//! sending. Swapping in a real store means implementing this one trait —
//! neither the chunker nor the orchestrator changes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::config::KnowledgeStoreConfig;
use crate::models::Chunk;

/// Destination for chunked documents.
#[async_trait]
pub trait KnowledgeSink: Send + Sync {
    /// Hands a document's chunks to the retrieval index. Fire-and-forget
    /// from the webhook's point of view; errors are logged by the caller
    /// and never surface to the triggering request.
    async fn ingest(&self, document_id: i64, document_name: &str, chunks: &[Chunk]) -> Result<()>;
}

/// Stub sink for an Open WebUI knowledge base.
pub struct OpenWebUiSink {
    config: KnowledgeStoreConfig,
}

impl OpenWebUiSink {
    pub fn new(config: &KnowledgeStoreConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl KnowledgeSink for OpenWebUiSink {
    async fn ingest(&self, document_id: i64, document_name: &str, chunks: &[Chunk]) -> Result<()> {
        if !self.config.is_configured() {
            tracing::warn!(
                document_id,
                "knowledge store credentials incomplete; skipping ingestion"
            );
            return Ok(());
        }
        // is_configured() checked all three fields above.
        let base_url = self.config.base_url.as_deref().unwrap_or_default();
        let knowledge_base = self.config.knowledge_base.as_deref().unwrap_or_default();

        let endpoint = format!(
            "{}/api/v1/knowledge-base/{}/ingest",
            base_url.trim_end_matches('/'),
            knowledge_base
        );
        tracing::info!(
            document_id,
            document_name,
            chunks = chunks.len(),
            endpoint = %endpoint,
            "ingesting into knowledge store (stubbed)"
        );

        let ingested_at = Utc::now();
        for chunk in chunks {
            let payload = json!({
                "chunk_id": format!("{}-{}", document_id, chunk.chunk_index),
                "text": chunk.text,
                "hash": chunk.hash,
                "metadata": chunk.metadata,
                "ingested_at": ingested_at,
            });
            tracing::debug!(
                chunk_index = chunk.chunk_index,
                chars = chunk.text.chars().count(),
                payload = %payload,
                "chunk payload prepared"
            );
        }

        tracing::info!(document_id, "ingestion finished");
        Ok(())
    }
}
