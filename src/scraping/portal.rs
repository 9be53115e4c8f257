//! Portal-specific scrapers. One engine (`SelectorScraper`) runs the shared
//! algorithm; each supported portal is described by a `PortalProfile`, a
//! selector table plus a source tag. Portals that render the same board
//! software (justjoin.it / rocketjobs.pl) share a table and differ only in
//! the tag.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::config::ScraperConfig;
use crate::core::error::ScrapeError;
use crate::core::types::{ScrapedJob, SourceType};
use crate::scraping::browser::BrowserPool;
use crate::scraping::jsonld::{find_job_posting, job_from_json_ld};
use crate::scraping::parse::{
    parse_experience_level, parse_location_text, parse_salary_text, parse_workplace_type,
};
use crate::scraping::session;

/// A strategy that extracts jobs from a family of URLs.
#[async_trait]
pub trait JobScraper: Send + Sync {
    fn name(&self) -> &str;
    fn can_handle(&self, domain: &str) -> bool;
    async fn scrape_job(&self, url: &str) -> Result<ScrapedJob, ScrapeError>;
    /// Release any held resources (the pooled browser). Idempotent.
    async fn release(&self);
}

/// CSS selectors used to pull fields out of a rendered portal page.
#[derive(Clone, Debug)]
pub struct SelectorTable {
    pub title: &'static str,
    pub company: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub skills: &'static str,
    pub salary: &'static str,
    pub workplace: &'static str,
    pub experience: &'static str,
    pub logo: &'static str,
}

/// Everything portal-specific: which domain, how to tag results, which
/// selectors, and an optional element to wait for before extracting.
#[derive(Clone, Debug)]
pub struct PortalProfile {
    pub domain: &'static str,
    pub source_type: SourceType,
    pub selectors: SelectorTable,
    pub wait_for: Option<&'static str>,
}

const JUSTJOIN_SELECTORS: SelectorTable = SelectorTable {
    title: r#"h1[data-test-id="title"]"#,
    company: r#"[data-test-id="company-name"]"#,
    description: r#"[data-test-id="job-description"]"#,
    location: r#"[data-test-id="location"]"#,
    skills: r#"[data-test-id="skill-tag"]"#,
    salary: r#"[data-test-id="salary-range"]"#,
    workplace: r#"[data-test-id="workplace-type"]"#,
    experience: r#"[data-test-id="experience-level"]"#,
    logo: r#"[data-test-id="company-logo"] img"#,
};

pub fn justjoin_profile() -> PortalProfile {
    PortalProfile {
        domain: "justjoin.it",
        source_type: SourceType::JustJoinIt,
        selectors: JUSTJOIN_SELECTORS,
        wait_for: Some(r#"h1[data-test-id="title"]"#),
    }
}

/// rocketjobs.pl runs the same board software as justjoin.it, so the
/// selector table is shared and only the source tag differs.
pub fn rocketjobs_profile() -> PortalProfile {
    PortalProfile {
        domain: "rocketjobs.pl",
        source_type: SourceType::RocketJobs,
        selectors: JUSTJOIN_SELECTORS,
        wait_for: Some(r#"h1[data-test-id="title"]"#),
    }
}

pub fn pracuj_profile() -> PortalProfile {
    PortalProfile {
        domain: "pracuj.pl",
        source_type: SourceType::PracujPl,
        selectors: SelectorTable {
            title: r#"[data-test="text-jobTitle"]"#,
            company: r#"[data-test="text-companyName"]"#,
            description: r#"[data-test="section-description"]"#,
            location: r#"[data-test="text-location"]"#,
            skills: r#"[data-test*="skill"]"#,
            salary: r#"[data-test*="salary"]"#,
            workplace: r#"[data-test*="workplace"], [data-test*="remote"]"#,
            experience: r#"[data-test*="experience"], [data-test*="seniority"]"#,
            logo: r#"[data-test="image-company"] img"#,
        },
        wait_for: Some(r#"[data-test="text-jobTitle"]"#),
    }
}

/// The shared portal engine: render the page, prefer embedded JSON-LD, fall
/// back to the profile's selector table.
pub struct SelectorScraper {
    profile: PortalProfile,
    config: ScraperConfig,
    browser: Arc<BrowserPool>,
}

impl SelectorScraper {
    pub fn new(profile: PortalProfile, config: ScraperConfig, browser: Arc<BrowserPool>) -> Self {
        Self {
            profile,
            config,
            browser,
        }
    }

    /// One JS pass that collects every selector's text in a single round trip.
    fn extraction_script(&self) -> String {
        let s = &self.profile.selectors;
        format!(
            "(() => {{ \
             const text = sel => {{ const el = document.querySelector(sel); return el ? el.textContent.trim() : null; }}; \
             const all = sel => Array.from(document.querySelectorAll(sel)).map(el => el.textContent.trim()).filter(Boolean); \
             const attr = (sel, a) => {{ const el = document.querySelector(sel); return el ? el.getAttribute(a) : null; }}; \
             return {{ \
               title: text({title:?}), \
               company: text({company:?}), \
               description: text({description:?}), \
               location: text({location:?}), \
               skills: all({skills:?}), \
               salary: text({salary:?}), \
               workplace: text({workplace:?}), \
               experience: text({experience:?}), \
               logo: attr({logo:?}, 'src') \
             }}; }})()",
            title = s.title,
            company = s.company,
            description = s.description,
            location = s.location,
            skills = s.skills,
            salary = s.salary,
            workplace = s.workplace,
            experience = s.experience,
            logo = s.logo,
        )
    }

    async fn scrape_inner(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        let page = self.browser.acquire().await?;

        // Compute in a block so the tab is closed on every path.
        let result = async {
            session::inject_cookies(&page, &self.config.cookies).await;
            session::navigate_with_timeout(&page, url, self.config.timeout).await?;
            if let Some(selector) = self.profile.wait_for {
                session::wait_for_selector(&page, selector, Duration::from_secs(5)).await;
            }
            session::dismiss_cookie_banners(&page).await;

            let html = session::page_content(&page).await?;
            let payload = session::eval_json(&page, &self.extraction_script()).await;

            if let Some(posting) = find_job_posting(&html) {
                debug!("{}: JSON-LD JobPosting found", self.profile.domain);
                let mut job = job_from_json_ld(&posting, url, self.profile.source_type);
                // Structured data is often incomplete; selectors fill the gaps.
                if let Some(payload) = &payload {
                    enrich_from_dom_payload(&mut job, payload);
                }
                return Ok(job);
            }

            let payload = payload.ok_or_else(|| {
                ScrapeError::Render(format!(
                    "{}: selector extraction returned nothing",
                    self.profile.domain
                ))
            })?;
            Ok(job_from_dom_payload(
                &payload,
                url,
                self.profile.source_type,
            ))
        }
        .await;

        page.close().await.ok();
        result
    }
}

fn payload_text(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn payload_skills(payload: &Value) -> Vec<String> {
    match payload.get("skills") {
        Some(Value::Array(skills)) => skills
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Fill fields the structured-data pass left empty from the selector
/// payload. Never overwrites an already-populated field.
pub fn enrich_from_dom_payload(job: &mut ScrapedJob, payload: &Value) {
    use crate::core::types::{UNKNOWN_COMPANY, UNKNOWN_POSITION};

    if job.title == UNKNOWN_POSITION {
        if let Some(title) = payload_text(payload, "title") {
            job.title = title;
        }
    }
    if job.company_name == UNKNOWN_COMPANY {
        if let Some(company) = payload_text(payload, "company") {
            job.company_name = company;
        }
    }
    if job.description.is_empty() {
        if let Some(description) = payload_text(payload, "description") {
            job.description = description;
        }
    }
    if job.location.city.is_empty() {
        if let Some(location) = payload_text(payload, "location") {
            job.location = parse_location_text(&location);
        }
    }
    if job.required_skills.is_empty() {
        job.required_skills = payload_skills(payload);
    }
    if job.salary.is_none() {
        job.salary = payload_text(payload, "salary")
            .as_deref()
            .and_then(parse_salary_text)
            .map(|s| vec![s]);
    }
    if job.workplace_type.is_none() {
        job.workplace_type = payload_text(payload, "workplace")
            .as_deref()
            .and_then(parse_workplace_type);
    }
    if job.experience_level.is_none() {
        job.experience_level = payload_text(payload, "experience")
            .as_deref()
            .and_then(parse_experience_level);
    }
    if job.company_logo_url.is_none() {
        job.company_logo_url = payload_text(payload, "logo");
    }
}

/// Map the one-shot JS extraction payload onto the canonical record.
pub fn job_from_dom_payload(payload: &Value, url: &str, source_type: SourceType) -> ScrapedJob {
    let text = |key: &str| payload_text(payload, key);

    let mut job = ScrapedJob::empty(url, source_type);
    if let Some(title) = text("title") {
        job.title = title;
    }
    if let Some(company) = text("company") {
        job.company_name = company;
    }
    if let Some(description) = text("description") {
        job.description = description;
    }
    if let Some(location) = text("location") {
        job.location = parse_location_text(&location);
    }
    job.required_skills = payload_skills(payload);
    job.salary = text("salary")
        .as_deref()
        .and_then(parse_salary_text)
        .map(|s| vec![s]);
    job.workplace_type = text("workplace").as_deref().and_then(parse_workplace_type);
    job.experience_level = text("experience")
        .as_deref()
        .and_then(parse_experience_level);
    job.company_logo_url = text("logo");
    job
}

#[async_trait]
impl JobScraper for SelectorScraper {
    fn name(&self) -> &str {
        self.profile.domain
    }

    fn can_handle(&self, domain: &str) -> bool {
        domain == self.profile.domain || domain.ends_with(&format!(".{}", self.profile.domain))
    }

    async fn scrape_job(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        info!("portal scrape ({}): {url}", self.profile.domain);
        self.scrape_inner(url).await
    }

    async fn release(&self) {
        self.browser.shutdown().await;
    }
}
