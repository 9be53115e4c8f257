//! joblens — normalized job-posting extraction.
//!
//! Takes a job-offer URL and returns one canonical record, produced by
//! whichever strategy fits: embedded JSON-LD structured data, a
//! portal-specific DOM scraper, or LLM extraction over the rendered page.
//! Results are cached by normalized URL.

pub mod ai;
pub mod cache;
pub mod core;
pub mod scraping;
pub mod service;

// --- Primary exports ---
pub use core::error::ScrapeError;
pub use core::types;
pub use core::types::*;
pub use core::AppState;
pub use service::{ScrapeMethod, ScrapeOptions, ScraperService};
