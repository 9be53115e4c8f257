//! Page-to-markdown conversion for the AI pipeline. The default backend is
//! a Jina-style reader endpoint that renders a URL server-side and returns
//! LLM-friendly markdown.

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::ScrapeError;

/// Turns a URL into plain-text/markdown page content.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn to_markdown(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Reader-endpoint backend: `GET {base_url}/{url}` returns the rendered page
/// as markdown.
pub struct JinaReader {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl JinaReader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout_secs: 60,
        }
    }

    /// Bound on the reader round trip, also forwarded upstream so the
    /// reader endpoint gives up on slow pages instead of us.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[async_trait]
impl DocumentConverter for JinaReader {
    async fn to_markdown(&self, url: &str) -> Result<String, ScrapeError> {
        let request_url = format!("{}/{}", self.base_url.trim_end_matches('/'), url);
        debug!("reader fetch: {request_url}");

        let response = self
            .client
            .get(&request_url)
            .header("Accept", "text/plain")
            .header("X-Return-Format", "markdown")
            .header("X-Timeout", self.timeout_secs.to_string())
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::UpstreamService {
                service: "reader",
                status: status.as_u16(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, self.timeout_secs))
    }
}
