use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default title substituted when no strategy could determine one.
pub const UNKNOWN_POSITION: &str = "Unknown Position";
/// Default company name substituted when no strategy could determine one.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// The canonical job record — the sole output shape of every extraction
/// strategy. Field names on the wire match the upstream CV-generation
/// service's contract (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedJob {
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub location: JobLocation,
    pub required_skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace_type: Option<WorkplaceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_time: Option<WorkingTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Vec<SalaryRange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo_url: Option<String>,
    /// Always the *normalized* input URL.
    pub source_url: String,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Opaque source payload retained for debugging/traceability only —
    /// never consumed downstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
}

impl ScrapedJob {
    /// An empty record for `source_url`/`source_type`, with placeholder
    /// title/company. Strategies fill this in field by field.
    pub fn empty(source_url: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            title: UNKNOWN_POSITION.to_string(),
            company_name: UNKNOWN_COMPANY.to_string(),
            description: String::new(),
            location: JobLocation::default(),
            required_skills: Vec::new(),
            nice_to_have_skills: Vec::new(),
            workplace_type: None,
            working_time: None,
            experience_level: None,
            salary: None,
            languages: None,
            company_logo_url: None,
            source_url: source_url.into(),
            source_type,
            published_at: None,
            raw_data: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobLocation {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WorkplaceType {
    Hybrid,
    Remote,
    OnSite,
    Office,
    Mobile,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkingTime {
    FullTime,
    PartTime,
    Freelance,
    Internship,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
    CLevel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Permanent,
    B2b,
    MandateContract,
    Any,
    Freelance,
    Internship,
    Contract,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub from: Option<f64>,
    pub to: Option<f64>,
    /// Currency code, e.g. PLN, USD, EUR.
    pub currency: String,
    #[serde(rename = "type")]
    pub salary_type: SalaryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross: Option<bool>,
}

impl SalaryRange {
    /// Enforce `from <= to` when both bounds are present by swapping a
    /// reversed pair. Every mapper runs its output through this.
    pub fn normalized(mut self) -> Self {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                self.from = Some(to);
                self.to = Some(from);
            }
        }
        self
    }
}

/// Which domain/strategy produced the record. `Other` is stamped by the AI
/// strategy and by any source without a registered portal scraper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceType {
    #[serde(rename = "pracuj.pl")]
    PracujPl,
    #[serde(rename = "justjoin.it")]
    JustJoinIt,
    #[serde(rename = "rocketjobs.pl")]
    RocketJobs,
    #[serde(rename = "linkedin")]
    Linkedin,
    #[serde(rename = "nofluffjobs")]
    NoFluffJobs,
    #[serde(rename = "other")]
    Other,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::PracujPl => "pracuj.pl",
            SourceType::JustJoinIt => "justjoin.it",
            SourceType::RocketJobs => "rocketjobs.pl",
            SourceType::Linkedin => "linkedin",
            SourceType::NoFluffJobs => "nofluffjobs",
            SourceType::Other => "other",
        }
    }
}

// ── HTTP API types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeJobRequest {
    pub url: String,
    #[serde(default)]
    pub skip_cache: bool,
    #[serde(default)]
    pub method: crate::service::ScrapeMethod,
    #[serde(default)]
    pub ai_model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanScrapeRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanScrapeResponse {
    /// Always true — the AI strategy handles any URL.
    pub can_scrape: bool,
    pub has_portal_specific: bool,
    pub supported_domains: Vec<String>,
    pub ai_available: bool,
    pub recommended_method: crate::service::ScrapeMethod,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SupportedDomainsResponse {
    pub domains: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
