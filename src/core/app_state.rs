use std::sync::Arc;

use tracing::warn;

use crate::ai::{AiUniversalScraper, JinaReader, OpenAiClient};
use crate::core::config::{JoblensConfig, ScraperConfig};
use crate::scraping::registry::ScraperRegistry;
use crate::service::ScraperService;

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub service: Arc<ScraperService>,
    pub config: Arc<JoblensConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("supported_domains", &self.service.supported_domains())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client) -> Self {
        let config = Arc::new(crate::core::config::load_config());
        let scraper_config = ScraperConfig::default();

        let registry = match ScraperRegistry::standard(scraper_config) {
            Some(registry) => registry,
            None => {
                warn!("no Chromium-family browser found, portal scrapers disabled (AI extraction still available)");
                ScraperRegistry::empty()
            }
        };

        let reader = Arc::new(
            JinaReader::new(http_client.clone(), config.ai.resolve_reader_base_url())
                .with_timeout(config.ai.resolve_reader_timeout_secs()),
        );
        let completion = Arc::new(OpenAiClient::new(
            http_client.clone(),
            config.ai.resolve_base_url(),
            config.ai.resolve_api_key(),
        ));
        let ai = Arc::new(AiUniversalScraper::new(reader, completion, &config.ai));

        Self {
            http_client,
            service: Arc::new(ScraperService::new(registry, ai)),
            config,
        }
    }
}
