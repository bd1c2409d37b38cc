//! Wiki platform client.
//!
//! [`BookStackClient`] talks to a BookStack instance's REST API to pull page
//! content in Markdown. The [`ContentFetcher`] trait is the seam the sync
//! pipeline depends on, so tests (and future platforms) can substitute their
//! own fetcher.
//!
//! Fetch failures are a valid, silent outcome: they are logged at warn level
//! and surface as `None`, never as an error to the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::time::Duration;

use crate::config::WikiConfig;

/// Source of document content, keyed by page id.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Returns the page's Markdown body, or `None` if the page is
    /// unavailable for any reason (network, auth, not found, bad shape).
    async fn fetch_page(&self, page_id: i64) -> Option<String>;
}

/// REST client for a BookStack instance.
pub struct BookStackClient {
    http: reqwest::Client,
    base_url: String,
}

impl BookStackClient {
    /// Builds a client with the configured credentials and a bounded
    /// per-request timeout.
    pub fn new(config: &WikiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = format!("Token {}:{}", config.token_id, config.token_secret);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token).context("wiki API token contains invalid characters")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build wiki HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ContentFetcher for BookStackClient {
    async fn fetch_page(&self, page_id: i64) -> Option<String> {
        // GET /api/pages/{id}; the `markdown` field carries the page body.
        let url = format!("{}api/pages/{}", self.base_url, page_id);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(page_id, error = %e, "wiki request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(page_id, status = %response.status(), "wiki returned an error status");
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(page_id, error = %e, "wiki response was not valid JSON");
                return None;
            }
        };

        match body.get("markdown").and_then(|v| v.as_str()) {
            Some(markdown) => Some(markdown.to_string()),
            None => {
                tracing::warn!(page_id, "wiki response carried no markdown field");
                None
            }
        }
    }
}
