//! Domain → scraper routing. The registry owns the portal scrapers; lookup
//! matches the registered domain exactly or as a suffix, so subdomains like
//! `it.pracuj.pl` resolve to the `pracuj.pl` scraper.

use std::sync::Arc;

use crate::core::config::ScraperConfig;
use crate::scraping::browser::BrowserPool;
use crate::scraping::portal::{
    justjoin_profile, pracuj_profile, rocketjobs_profile, JobScraper, SelectorScraper,
};
use crate::scraping::url::extract_domain;

pub struct ScraperRegistry {
    scrapers: Vec<Arc<dyn JobScraper>>,
}

impl ScraperRegistry {
    /// The standard set of portal scrapers, all sharing one browser pool.
    /// `None` when no browser executable is installed; the AI strategy still
    /// works without one.
    pub fn standard(config: ScraperConfig) -> Option<Self> {
        let pool = BrowserPool::new_auto(config.user_agent.clone())?;
        let scrapers: Vec<Arc<dyn JobScraper>> = vec![
            Arc::new(SelectorScraper::new(
                justjoin_profile(),
                config.clone(),
                pool.clone(),
            )),
            Arc::new(SelectorScraper::new(
                rocketjobs_profile(),
                config.clone(),
                pool.clone(),
            )),
            Arc::new(SelectorScraper::new(pracuj_profile(), config, pool)),
        ];
        Some(Self { scrapers })
    }

    pub fn empty() -> Self {
        Self {
            scrapers: Vec::new(),
        }
    }

    pub fn from_scrapers(scrapers: Vec<Arc<dyn JobScraper>>) -> Self {
        Self { scrapers }
    }

    /// The scraper registered for this URL's domain, if any.
    pub fn resolve(&self, url: &str) -> Option<Arc<dyn JobScraper>> {
        let domain = extract_domain(url);
        if domain.is_empty() {
            return None;
        }
        self.scrapers
            .iter()
            .find(|s| s.can_handle(&domain))
            .cloned()
    }

    pub fn has_portal_scraper(&self, url: &str) -> bool {
        self.resolve(url).is_some()
    }

    pub fn supported_domains(&self) -> Vec<String> {
        self.scrapers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Shut down every scraper's held resources.
    pub async fn release_all(&self) {
        for scraper in &self.scrapers {
            scraper.release().await;
        }
    }
}
