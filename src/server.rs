//! Webhook HTTP server.
//!
//! Receives BookStack webhook notifications and acknowledges them
//! immediately; the actual fetch/chunk/ingest work happens in a detached
//! background task so webhook latency never depends on processing latency.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/webhook/bookstack` | Receive a page change notification |
//! | `GET`  | `/` | Service banner and monitored books |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Acknowledgment Contract
//!
//! Every parseable notification is acknowledged with one of:
//!
//! ```json
//! { "status": "ignored", "reason": "Event type page_delete not supported" }
//! { "status": "ignored", "reason": "Book not in monitored list" }
//! { "status": "success", "message": "Processing of page 7 started in background" }
//! ```
//!
//! Downstream failures (fetch, chunking, ingestion) never affect the
//! acknowledgment — they are contained in the background task and logged.

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::sink::{KnowledgeSink, OpenWebUiSink};
use crate::sync::{process_page_update, SyncContext};
use crate::wiki::{BookStackClient, ContentFetcher};

/// Webhook events that trigger a sync. Everything else is acknowledged
/// and ignored.
const SUPPORTED_EVENTS: [&str; 2] = ["page_create", "page_update"];

/// Shared application state passed to all route handlers via Axum's
/// `State` extractor. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    monitored_books: Arc<HashSet<i64>>,
    sync: Arc<SyncContext>,
}

impl AppState {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn ContentFetcher>,
        sink: Arc<dyn KnowledgeSink>,
    ) -> Self {
        let monitored_books: HashSet<i64> = config.wiki.monitored_books.iter().copied().collect();
        let sync = SyncContext {
            fetcher,
            sink,
            wiki_base_url: config.wiki.base_url.clone(),
            params: *config.chunk_params(),
        };
        Self {
            config: Arc::new(config.clone()),
            monitored_books: Arc::new(monitored_books),
            sync: Arc::new(sync),
        }
    }
}

/// The `related_item` block of a BookStack webhook payload.
#[derive(Debug, Deserialize)]
pub struct WebhookRelatedItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub book_id: i64,
    #[serde(default)]
    pub chapter_id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Inbound BookStack webhook payload.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub related_item: WebhookRelatedItem,
}

/// Acknowledgment returned for every parseable notification.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Ack {
    Ignored { reason: String },
    Success { message: String },
}

/// Starts the webhook server with the concrete wiki client and store sink.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let fetcher: Arc<dyn ContentFetcher> = Arc::new(BookStackClient::new(&config.wiki)?);
    let sink: Arc<dyn KnowledgeSink> = Arc::new(OpenWebUiSink::new(&config.knowledge_store));
    let state = AppState::new(config, fetcher, sink);

    if !config.knowledge_store.is_configured() {
        tracing::warn!("knowledge store not fully configured; ingestion will be skipped");
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(bind = %config.server.bind, "webhook server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router. Public so integration tests can serve
/// the real app with stub collaborators.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/bookstack", post(handle_webhook))
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ POST /webhook/bookstack ============

/// Handler for `POST /webhook/bookstack`.
///
/// Filters the notification by event kind and monitored book, then spawns
/// the background sync and returns immediately. A body that fails to
/// deserialize is rejected by the `Json` extractor before this runs — the
/// only case in which the endpoint does not acknowledge.
async fn handle_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<Ack> {
    if !SUPPORTED_EVENTS.contains(&payload.event.as_str()) {
        tracing::info!(event = %payload.event, "ignoring unsupported event");
        return Json(Ack::Ignored {
            reason: format!("Event type {} not supported", payload.event),
        });
    }

    let page_id = payload.related_item.id;
    let book_id = payload.related_item.book_id;
    let page_name = payload.related_item.name;

    if !state.monitored_books.contains(&book_id) {
        tracing::info!(book_id, page_id, "ignoring page outside the monitored books");
        return Json(Ack::Ignored {
            reason: "Book not in monitored list".to_string(),
        });
    }

    let sync = state.sync.clone();
    tokio::spawn(async move {
        process_page_update(&sync, page_id, &page_name).await;
    });

    Json(Ack::Success {
        message: format!("Processing of page {} started in background", page_id),
    })
}

// ============ GET / ============

/// JSON response body for `GET /`.
#[derive(Serialize)]
struct RootResponse {
    message: String,
    monitored_books: Vec<i64>,
}

/// Handler for `GET /`. Service banner with the monitored book ids.
async fn handle_root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "wikisync is running".to_string(),
        monitored_books: state.config.wiki.monitored_books.clone(),
    })
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    monitored_books_count: usize,
    monitored_books: Vec<i64>,
}

/// Handler for `GET /health`. Used by load balancers and monitoring tools.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        monitored_books_count: state.monitored_books.len(),
        monitored_books: state.config.wiki.monitored_books.clone(),
    })
}
