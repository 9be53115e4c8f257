//! End-to-end tests of the orchestration layer: strategy routing, the
//! auto-mode fallback chain, and cache behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use joblens::ai::UniversalScraper;
use joblens::cache::JobCache;
use joblens::scraping::portal::JobScraper;
use joblens::scraping::registry::ScraperRegistry;
use joblens::types::{ScrapedJob, SourceType};
use joblens::{ScrapeError, ScrapeMethod, ScrapeOptions, ScraperService};

type CallLog = Arc<Mutex<Vec<&'static str>>>;

struct StubAi {
    calls: AtomicUsize,
    log: CallLog,
    fail: bool,
}

impl StubAi {
    fn new(log: CallLog, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            log,
            fail,
        })
    }
}

#[async_trait]
impl UniversalScraper for StubAi {
    async fn scrape_job(&self, url: &str, _model: Option<&str>) -> Result<ScrapedJob, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("ai");
        if self.fail {
            return Err(ScrapeError::SchemaValidation(
                "model output rejected".to_string(),
            ));
        }
        let mut job = ScrapedJob::empty(url, SourceType::Other);
        job.title = "AI Extracted Role".to_string();
        Ok(job)
    }
}

struct StubPortal {
    domain: &'static str,
    source_type: SourceType,
    calls: AtomicUsize,
    releases: AtomicUsize,
    log: CallLog,
    fail: bool,
}

impl StubPortal {
    fn new(domain: &'static str, source_type: SourceType, log: CallLog, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            domain,
            source_type,
            calls: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            log,
            fail,
        })
    }
}

#[async_trait]
impl JobScraper for StubPortal {
    fn name(&self) -> &str {
        self.domain
    }

    fn can_handle(&self, domain: &str) -> bool {
        domain == self.domain || domain.ends_with(&format!(".{}", self.domain))
    }

    async fn scrape_job(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("portal");
        if self.fail {
            return Err(ScrapeError::Render("selectors matched nothing".to_string()));
        }
        let mut job = ScrapedJob::empty(url, self.source_type);
        job.title = "Portal Extracted Role".to_string();
        Ok(job)
    }

    async fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn service_with(
    ai: Arc<StubAi>,
    portals: Vec<Arc<StubPortal>>,
    cache: JobCache,
) -> ScraperService {
    let scrapers = portals
        .into_iter()
        .map(|p| p as Arc<dyn JobScraper>)
        .collect();
    ScraperService::with_cache(ScraperRegistry::from_scrapers(scrapers), ai, cache)
}

fn options(method: ScrapeMethod) -> ScrapeOptions {
    ScrapeOptions {
        method,
        ..Default::default()
    }
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let service = service_with(ai.clone(), vec![], JobCache::new());

    let url = "https://jobs.example.com/offer/1";
    let first = service.scrape_job(url, &options(ScrapeMethod::Ai)).await.unwrap();
    let second = service.scrape_job(url, &options(ScrapeMethod::Ai)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ai.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn url_variants_share_one_cache_entry() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let service = service_with(ai.clone(), vec![], JobCache::new());

    service
        .scrape_job("https://jobs.example.com/offer/1?utm=x#apply", &options(ScrapeMethod::Ai))
        .await
        .unwrap();
    let second = service
        .scrape_job("https://jobs.example.com/offer/1", &options(ScrapeMethod::Ai))
        .await
        .unwrap();

    assert_eq!(ai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.source_url, "https://jobs.example.com/offer/1");
}

#[tokio::test]
async fn skip_cache_forces_a_fresh_scrape() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let service = service_with(ai.clone(), vec![], JobCache::new());

    let url = "https://jobs.example.com/offer/1";
    service.scrape_job(url, &options(ScrapeMethod::Ai)).await.unwrap();
    let opts = ScrapeOptions {
        skip_cache: true,
        method: ScrapeMethod::Ai,
        ai_model: None,
    };
    service.scrape_job(url, &opts).await.unwrap();

    assert_eq!(ai.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_entry_triggers_a_rescrape() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let service = service_with(
        ai.clone(),
        vec![],
        JobCache::with_ttl(Duration::from_millis(10)),
    );

    let url = "https://jobs.example.com/offer/1";
    service.scrape_job(url, &options(ScrapeMethod::Ai)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    service.scrape_job(url, &options(ScrapeMethod::Ai)).await.unwrap();

    assert_eq!(ai.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failures_are_never_cached() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), true);
    let service = service_with(ai.clone(), vec![], JobCache::new());

    let url = "https://jobs.example.com/offer/1";
    assert!(service.scrape_job(url, &options(ScrapeMethod::Ai)).await.is_err());
    assert!(service.scrape_job(url, &options(ScrapeMethod::Ai)).await.is_err());

    assert_eq!(ai.calls.load(Ordering::SeqCst), 2);
    assert_eq!(service.cache_stats().size, 0);
}

#[tokio::test]
async fn auto_tries_ai_before_portal_fallback() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), true);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai.clone(), vec![portal.clone()], JobCache::new());

    let job = service
        .scrape_job("https://justjoin.it/offers/rust-dev", &options(ScrapeMethod::Auto))
        .await
        .unwrap();

    assert_eq!(job.source_type, SourceType::JustJoinIt);
    assert_eq!(*log.lock().unwrap(), vec!["ai", "portal"]);
    // the shared pool stays up for later requests
    assert_eq!(portal.releases.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auto_does_not_touch_portal_when_ai_succeeds() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai.clone(), vec![portal.clone()], JobCache::new());

    let job = service
        .scrape_job("https://justjoin.it/offers/rust-dev", &options(ScrapeMethod::Auto))
        .await
        .unwrap();

    assert_eq!(job.source_type, SourceType::Other);
    assert_eq!(portal.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auto_surfaces_ai_error_for_unregistered_domain() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), true);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai.clone(), vec![portal.clone()], JobCache::new());

    let err = service
        .scrape_job("https://jobs.example.com/offer/1", &options(ScrapeMethod::Auto))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::SchemaValidation(_)));
    assert_eq!(portal.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ai_success_for_unregistered_domain_is_tagged_other() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai, vec![portal], JobCache::new());

    let url = "https://careers.example.io/roles/42";
    let job = service.scrape_job(url, &options(ScrapeMethod::Auto)).await.unwrap();
    assert_eq!(job.source_type, SourceType::Other);

    let probe = service.can_scrape(url);
    assert!(probe.can_scrape);
    assert!(!probe.has_portal_specific);
    assert_eq!(probe.recommended_method, ScrapeMethod::Ai);
}

#[tokio::test]
async fn portal_specific_rejects_unknown_domain() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai.clone(), vec![portal], JobCache::new());

    let err = service
        .scrape_job(
            "https://jobs.example.com/offer/1",
            &options(ScrapeMethod::PortalSpecific),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::UnsupportedDomain { ref domain } if domain == "jobs.example.com"));
    assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn portal_specific_never_falls_back_to_ai() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), true);
    let service = service_with(ai.clone(), vec![portal.clone()], JobCache::new());

    let err = service
        .scrape_job(
            "https://justjoin.it/offers/rust-dev",
            &options(ScrapeMethod::PortalSpecific),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Render(_)));
    assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn portal_resources_survive_scrapes_until_shutdown() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("justjoin.it", SourceType::JustJoinIt, log.clone(), false);
    let service = service_with(ai, vec![portal.clone()], JobCache::new());

    // A second request may still be using the shared browser, so a finished
    // scrape must not tear it down.
    for url in [
        "https://justjoin.it/offers/rust-dev",
        "https://justjoin.it/offers/go-dev",
    ] {
        service
            .scrape_job(url, &options(ScrapeMethod::PortalSpecific))
            .await
            .unwrap();
    }
    assert_eq!(portal.calls.load(Ordering::SeqCst), 2);
    assert_eq!(portal.releases.load(Ordering::SeqCst), 0);

    service.shutdown().await;
    assert_eq!(portal.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn can_scrape_recommends_auto_for_registered_domain() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let portal = StubPortal::new("pracuj.pl", SourceType::PracujPl, log.clone(), false);
    let service = service_with(ai, vec![portal], JobCache::new());

    let probe = service.can_scrape("https://www.pracuj.pl/praca/dev,oferta,123");
    assert!(probe.has_portal_specific);
    assert_eq!(probe.recommended_method, ScrapeMethod::Auto);
    assert_eq!(probe.supported_domains, vec!["pracuj.pl".to_string()]);
}

#[tokio::test]
async fn clear_cache_empties_stats() {
    let log: CallLog = Default::default();
    let ai = StubAi::new(log.clone(), false);
    let service = service_with(ai, vec![], JobCache::new());

    service
        .scrape_job("https://jobs.example.com/offer/1", &options(ScrapeMethod::Ai))
        .await
        .unwrap();
    service.clear_cache();
    assert_eq!(service.cache_stats().size, 0);
}
