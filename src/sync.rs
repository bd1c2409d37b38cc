//! Background synchronization of a single page.
//!
//! One webhook notification maps to one detached unit of work: fetch the
//! page body, chunk it, hand the chunks to the sink. The unit runs to
//! completion or fails silently — every failure below is logged and
//! contained here, never propagated to the request that triggered it.
//! Concurrent units are independent and unordered.

use std::sync::Arc;

use crate::chunk::{chunk_document, ChunkParams};
use crate::models::{ChunkMetadata, Document};
use crate::sink::KnowledgeSink;
use crate::wiki::ContentFetcher;

/// Read-only collaborators shared by all background units.
pub struct SyncContext {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub sink: Arc<dyn KnowledgeSink>,
    pub wiki_base_url: String,
    pub params: ChunkParams,
}

/// Fetch, chunk, and ingest one page.
pub async fn process_page_update(ctx: &SyncContext, page_id: i64, page_name: &str) {
    tracing::info!(page_id, page_name, "processing page update");

    let Some(body) = ctx.fetcher.fetch_page(page_id).await else {
        tracing::warn!(page_id, "page content unavailable; skipping");
        return;
    };
    if body.is_empty() {
        tracing::warn!(page_id, "page body is empty; skipping");
        return;
    }

    let doc = Document {
        id: page_id,
        name: page_name.to_string(),
        body,
    };
    let meta = ChunkMetadata::for_page(&ctx.wiki_base_url, page_id, page_name);
    let chunks = chunk_document(&doc, &meta, &ctx.params);
    tracing::info!(page_id, chunks = chunks.len(), "chunked page body");

    if let Err(e) = ctx.sink.ingest(doc.id, &doc.name, &chunks).await {
        tracing::error!(page_id, error = %e, "knowledge store ingestion failed");
        return;
    }

    tracing::info!(page_id, "page processing finished");
}
