//! Classified extraction errors.
//!
//! Every strategy (portal-specific or AI) fails with one of these variants so
//! the orchestrator and the HTTP layer can branch on the failure class rather
//! than string-matching messages. Extraction is all-or-nothing: a partial
//! record is never returned alongside an error.

use thiserror::Error;

/// Errors surfaced by any extraction strategy.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure reaching the rendering, document-conversion, or LLM endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// Navigation or completion exceeded its bound.
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The headless rendering session failed (launch, tab, or in-page query).
    #[error("render error: {0}")]
    Render(String),

    /// LLM output did not match the extraction schema.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// Explicit portal-specific mode requested for a domain with no registered scraper.
    #[error("no portal-specific scraper registered for domain: {domain}")]
    UnsupportedDomain { domain: String },

    /// Document-conversion or LLM service answered with a non-success status
    /// or an implausible body.
    #[error("{service} failed: status {status}: {message}")]
    UpstreamService {
        service: &'static str,
        status: u16,
        message: String,
    },
}

impl ScrapeError {
    /// Stable machine-readable tag for the HTTP error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Network(_) => "network",
            ScrapeError::Timeout { .. } => "timeout",
            ScrapeError::Render(_) => "render",
            ScrapeError::SchemaValidation(_) => "schema_validation",
            ScrapeError::UnsupportedDomain { .. } => "unsupported_domain",
            ScrapeError::UpstreamService { .. } => "upstream_service",
        }
    }

    /// Classify a `reqwest` failure: elapsed timeouts are [`ScrapeError::Timeout`],
    /// everything else is transport-level [`ScrapeError::Network`].
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout {
                seconds: timeout_secs,
            }
        } else {
            ScrapeError::Network(err.to_string())
        }
    }
}
