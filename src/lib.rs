//! # wikisync
//!
//! A webhook-driven wiki-to-RAG content synchronization bridge.
//!
//! wikisync listens for BookStack page webhooks, filters them against a
//! monitored-book allow-list, fetches the changed page's Markdown body over
//! the BookStack REST API, splits it into bounded overlapping chunks, and
//! hands the chunks (with source metadata) to a retrieval-augmented-generation
//! knowledge store.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  webhook  ┌──────────┐  spawn  ┌──────────────────────────┐
//! │ BookStack │──────────▶│  Server  │────────▶│ Fetch ▶ Chunk ▶ Ingest   │
//! └───────────┘   ack ◀───│  (axum)  │         │   (background task)      │
//!                         └──────────┘         └──────────────────────────┘
//! ```
//!
//! The webhook is acknowledged immediately; fetch, chunking, and ingestion
//! run in a detached task whose failures are logged, never surfaced.
//!
//! ## Quick Start
//!
//! ```bash
//! wikisync check                # validate configuration
//! wikisync chunk notes.md       # preview chunking of a local file
//! wikisync serve                # start the webhook server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types |
//! | [`chunk`] | Recursive separator-cascade text chunking |
//! | [`wiki`] | BookStack REST client and fetcher trait |
//! | [`sink`] | Knowledge-store sink trait and Open WebUI stub |
//! | [`sync`] | Background fetch → chunk → ingest orchestration |
//! | [`server`] | Webhook HTTP server |

pub mod chunk;
pub mod config;
pub mod models;
pub mod server;
pub mod sink;
pub mod sync;
pub mod wiki;
