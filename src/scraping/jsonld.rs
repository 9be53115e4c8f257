//! schema.org structured-data extraction. Most job boards embed a
//! `JobPosting` object in a `<script type="application/ld+json">` tag;
//! when present it is the cheapest and most reliable source of fields.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::core::types::{JobLocation, SalaryRange, SalaryType, ScrapedJob, SourceType};
use crate::scraping::parse::{parse_working_time, strip_html};

/// Scan a rendered document for the first schema.org `JobPosting` object.
/// Handles a top-level object, a top-level array, and an `@graph` wrapper.
/// Unparseable script bodies are skipped, never fatal.
pub fn find_job_posting(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for script in document.select(&selector) {
        let body = script.text().collect::<String>();
        let parsed: Value = match serde_json::from_str(body.trim()) {
            Ok(v) => v,
            Err(err) => {
                debug!("skipping malformed ld+json block: {err}");
                continue;
            }
        };
        if let Some(posting) = find_in_value(&parsed) {
            return Some(posting.clone());
        }
    }
    None
}

fn find_in_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(obj) => {
            if is_job_posting(value) {
                return Some(value);
            }
            if let Some(Value::Array(graph)) = obj.get("@graph") {
                return graph.iter().find(|v| is_job_posting(v));
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_in_value),
        _ => None,
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("JobPosting")),
        _ => false,
    }
}

/// Map a `JobPosting` object onto the canonical record. Missing fields fall
/// back to the record defaults; the source object is kept in `raw_data`.
pub fn job_from_json_ld(posting: &Value, source_url: &str, source_type: SourceType) -> ScrapedJob {
    let mut job = ScrapedJob::empty(source_url, source_type);

    if let Some(title) = str_field(posting, "title") {
        job.title = title;
    }
    if let Some(org) = posting.get("hiringOrganization") {
        if let Some(name) = str_field(org, "name") {
            job.company_name = name;
        }
        job.company_logo_url = logo_url(org.get("logo"));
    }
    if let Some(description) = str_field(posting, "description") {
        job.description = strip_html(&description);
    }
    job.location = location_from(posting.get("jobLocation"));
    job.published_at = str_field(posting, "datePosted");
    job.required_skills = skills_from(posting.get("skills"));
    job.working_time = working_time_from(posting.get("employmentType"));
    job.salary = salary_from(posting.get("baseSalary")).map(|s| vec![s]);
    job.raw_data = Some(posting.clone());
    job
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// `logo` arrives either as a bare URL string or as an `ImageObject`.
fn logo_url(logo: Option<&Value>) -> Option<String> {
    match logo? {
        Value::String(url) => Some(url.clone()),
        obj @ Value::Object(_) => str_field(obj, "url"),
        _ => None,
    }
}

/// `jobLocation` may be a single `Place` or an array of them; the first
/// entry with an address wins.
fn location_from(location: Option<&Value>) -> JobLocation {
    let place = match location {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    let Some(address) = place.and_then(|p| p.get("address")) else {
        return JobLocation::default();
    };
    JobLocation {
        city: str_field(address, "addressLocality").unwrap_or_default(),
        street: str_field(address, "streetAddress"),
        remote: None,
        hybrid: None,
    }
}

/// `employmentType` arrives as a keyword string or an array of them; the
/// first entry that maps wins.
fn working_time_from(employment_type: Option<&Value>) -> Option<crate::core::types::WorkingTime> {
    match employment_type? {
        Value::String(s) => parse_working_time(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .find_map(parse_working_time),
        _ => None,
    }
}

fn skills_from(skills: Option<&Value>) -> Vec<String> {
    match skills {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn salary_from(base_salary: Option<&Value>) -> Option<SalaryRange> {
    let value = base_salary?.get("value")?;
    let from = num_field(value, "minValue").or_else(|| num_field(value, "value"));
    let to = num_field(value, "maxValue").or(from);
    if from.is_none() && to.is_none() {
        return None;
    }
    let currency = str_field(base_salary?, "currency").unwrap_or_else(|| "PLN".to_string());
    Some(
        SalaryRange {
            from,
            to,
            currency,
            salary_type: SalaryType::Permanent,
            gross: Some(true),
        }
        .normalized(),
    )
}

fn num_field(value: &Value, key: &str) -> Option<f64> {
    let field = value.get(key)?;
    field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.replace(' ', "").parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorkingTime;

    const POSTING_HTML: &str = r#"<html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "JobPosting",
          "title": "Backend Developer",
          "hiringOrganization": {"@type": "Organization", "name": "Acme", "logo": {"url": "https://acme.example/logo.png"}},
          "description": "<p>Build <b>APIs</b> in Rust</p>",
          "jobLocation": {"@type": "Place", "address": {"addressLocality": "Warszawa", "streetAddress": "Prosta 51"}},
          "datePosted": "2025-03-01",
          "skills": ["Rust", "PostgreSQL"],
          "employmentType": "FULL_TIME",
          "baseSalary": {"currency": "PLN", "value": {"minValue": 18000, "maxValue": 24000}}
        }
        </script>
        </head><body></body></html>"#;

    #[test]
    fn finds_top_level_job_posting() {
        let posting = find_job_posting(POSTING_HTML).expect("posting should be found");
        assert_eq!(posting["title"], "Backend Developer");
    }

    #[test]
    fn finds_posting_inside_graph() {
        let html = r#"<script type="application/ld+json">
            {"@graph": [{"@type": "WebSite"}, {"@type": "JobPosting", "title": "QA Engineer"}]}
            </script>"#;
        let posting = find_job_posting(html).expect("posting inside @graph");
        assert_eq!(posting["title"], "QA Engineer");
    }

    #[test]
    fn finds_posting_inside_array() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "BreadcrumbList"}, {"@type": "JobPosting", "title": "DevOps"}]
            </script>"#;
        assert!(find_job_posting(html).is_some());
    }

    #[test]
    fn skips_malformed_blocks() {
        let html = r#"<script type="application/ld+json">{not json</script>
            <script type="application/ld+json">{"@type": "JobPosting", "title": "X"}</script>"#;
        assert!(find_job_posting(html).is_some());
    }

    #[test]
    fn no_posting_yields_none() {
        let html = r#"<script type="application/ld+json">{"@type": "Product"}</script>"#;
        assert!(find_job_posting(html).is_none());
    }

    #[test]
    fn maps_posting_to_canonical_record() {
        let posting = find_job_posting(POSTING_HTML).unwrap();
        let job = job_from_json_ld(
            &posting,
            "https://justjoin.it/offers/acme-backend",
            SourceType::JustJoinIt,
        );
        assert_eq!(job.title, "Backend Developer");
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.description, "Build APIs in Rust");
        assert_eq!(job.location.city, "Warszawa");
        assert_eq!(job.location.street.as_deref(), Some("Prosta 51"));
        assert_eq!(job.published_at.as_deref(), Some("2025-03-01"));
        assert_eq!(job.required_skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(job.working_time, Some(WorkingTime::FullTime));
        assert_eq!(
            job.company_logo_url.as_deref(),
            Some("https://acme.example/logo.png")
        );
        let salary = &job.salary.as_ref().unwrap()[0];
        assert_eq!(salary.from, Some(18_000.0));
        assert_eq!(salary.to, Some(24_000.0));
        assert_eq!(salary.currency, "PLN");
        assert_eq!(job.source_type, SourceType::JustJoinIt);
        assert!(job.raw_data.is_some());
    }

    #[test]
    fn employment_type_array_maps_to_working_time() {
        let posting = serde_json::json!({
            "@type": "JobPosting",
            "employmentType": ["PART_TIME", "TEMPORARY"]
        });
        let job = job_from_json_ld(&posting, "https://x.example/j", SourceType::Other);
        assert_eq!(job.working_time, Some(WorkingTime::PartTime));

        let none = serde_json::json!({"@type": "JobPosting", "employmentType": 7});
        let job = job_from_json_ld(&none, "https://x.example/j", SourceType::Other);
        assert_eq!(job.working_time, None);
    }

    #[test]
    fn skills_string_splits_on_commas() {
        let posting = serde_json::json!({
            "@type": "JobPosting",
            "skills": "Rust, Tokio , Axum"
        });
        let job = job_from_json_ld(&posting, "https://x.example/j", SourceType::Other);
        assert_eq!(job.required_skills, vec!["Rust", "Tokio", "Axum"]);
        assert_eq!(job.title, crate::core::types::UNKNOWN_POSITION);
    }
}
