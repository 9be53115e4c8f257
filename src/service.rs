//! The orchestration layer behind every endpoint: URL normalization, the
//! result cache, strategy selection, and the auto-mode fallback chain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::UniversalScraper;
use crate::cache::JobCache;
use crate::core::error::ScrapeError;
use crate::core::types::{CacheStats, CanScrapeResponse, ScrapedJob};
use crate::scraping::registry::ScraperRegistry;
use crate::scraping::url::{extract_domain, normalize_url};

/// How a scrape request should be served.
///
/// * `Ai` — universal LLM extraction, no portal scrapers involved.
/// * `PortalSpecific` — registered portal scraper only; fails for unknown
///   domains and never falls back to AI.
/// * `Auto` — AI first, then the portal scraper if one is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapeMethod {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "portal-specific")]
    PortalSpecific,
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub skip_cache: bool,
    pub method: ScrapeMethod,
    pub ai_model: Option<String>,
}

pub struct ScraperService {
    cache: JobCache,
    registry: ScraperRegistry,
    ai: Arc<dyn UniversalScraper>,
}

impl ScraperService {
    pub fn new(registry: ScraperRegistry, ai: Arc<dyn UniversalScraper>) -> Self {
        Self::with_cache(registry, ai, JobCache::new())
    }

    pub fn with_cache(
        registry: ScraperRegistry,
        ai: Arc<dyn UniversalScraper>,
        cache: JobCache,
    ) -> Self {
        Self {
            cache,
            registry,
            ai,
        }
    }

    /// Extract a job from `url`. The normalized URL is the cache key and the
    /// `sourceUrl` stamped on the result; successful extractions are cached.
    pub async fn scrape_job(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<ScrapedJob, ScrapeError> {
        let normalized = normalize_url(url);

        if !options.skip_cache {
            if let Some(cached) = self.cache.get(&normalized).await {
                info!("cache hit: {normalized}");
                return Ok(cached);
            }
        }

        let job = match options.method {
            ScrapeMethod::Ai => {
                self.ai
                    .scrape_job(&normalized, options.ai_model.as_deref())
                    .await?
            }
            ScrapeMethod::PortalSpecific => self.scrape_with_portal(&normalized).await?,
            ScrapeMethod::Auto => self.scrape_auto(&normalized, options).await?,
        };

        info!("scrape ok ({}): {}", job.source_type.as_str(), normalized);
        self.cache.insert(normalized, job.clone()).await;
        Ok(job)
    }

    /// Portal-only path. Unknown domains are a hard error here; AI is never
    /// consulted when the caller asked for a portal scraper.
    ///
    /// The per-call resource (the browser tab) is closed inside the scraper
    /// on every exit path. The pooled browser is shared across portals and
    /// concurrent requests, so it is only torn down in [`Self::shutdown`].
    async fn scrape_with_portal(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        let scraper = self
            .registry
            .resolve(url)
            .ok_or_else(|| ScrapeError::UnsupportedDomain {
                domain: extract_domain(url),
            })?;
        scraper.scrape_job(url).await
    }

    /// Auto mode: AI first. When AI fails and a portal scraper is registered
    /// for the domain, fall back to it; otherwise surface the AI error.
    async fn scrape_auto(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<ScrapedJob, ScrapeError> {
        match self.ai.scrape_job(url, options.ai_model.as_deref()).await {
            Ok(job) => Ok(job),
            Err(ai_err) => {
                if self.registry.has_portal_scraper(url) {
                    warn!("ai extraction failed ({ai_err}), falling back to portal scraper");
                    self.scrape_with_portal(url).await
                } else {
                    Err(ai_err)
                }
            }
        }
    }

    /// Every URL is scrapeable (the AI strategy has no domain restriction);
    /// the response tells the caller which strategy to prefer.
    pub fn can_scrape(&self, url: &str) -> CanScrapeResponse {
        let has_portal_specific = self.registry.has_portal_scraper(url);
        CanScrapeResponse {
            can_scrape: true,
            has_portal_specific,
            supported_domains: self.registry.supported_domains(),
            ai_available: true,
            recommended_method: if has_portal_specific {
                ScrapeMethod::Auto
            } else {
                ScrapeMethod::Ai
            },
        }
    }

    pub fn supported_domains(&self) -> Vec<String> {
        self.registry.supported_domains()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("result cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Shut down held resources (the portal browser pool).
    pub async fn shutdown(&self) {
        self.registry.release_all().await;
    }
}
