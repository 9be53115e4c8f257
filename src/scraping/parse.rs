//! Text-level heuristics shared by the portal scrapers and the AI pipeline:
//! HTML stripping, salary text parsing, and the Polish/English keyword
//! tables that map free text onto the typed enums.

use regex::Regex;
use scraper::Html;

use crate::core::types::{
    ExperienceLevel, JobLocation, SalaryRange, SalaryType, WorkingTime, WorkplaceType,
};

/// Flatten an HTML document to visible text. Script and style bodies are
/// removed before parsing, whitespace runs collapse to a single space.
pub fn strip_html(html: &str) -> String {
    let re_script_style =
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap();
    let re_whitespace = Regex::new(r"\s+").unwrap();
    let without_scripts = re_script_style.replace_all(html, " ");
    let fragment = Html::parse_fragment(&without_scripts);
    let text: String = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    re_whitespace.replace_all(&text, " ").trim().to_string()
}

/// Parse a displayed salary range like "15 000 - 20 000 PLN". Digits may be
/// grouped with spaces. Returns `None` when the text doesn't carry a range.
pub fn parse_salary_text(text: &str) -> Option<SalaryRange> {
    let re_salary = Regex::new(r"(\d[\d\s]*)\s*-\s*(\d[\d\s]*)\s*(\w+)").unwrap();
    let caps = re_salary.captures(text)?;
    let from: f64 = caps[1].replace(' ', "").parse().ok()?;
    let to: f64 = caps[2].replace(' ', "").parse().ok()?;
    let currency = caps[3].to_uppercase();
    Some(
        SalaryRange {
            from: Some(from),
            to: Some(to),
            currency,
            salary_type: SalaryType::Permanent,
            gross: Some(true),
        }
        .normalized(),
    )
}

/// Map displayed workplace text onto the enum. Polish portal labels are
/// matched alongside the English ones.
pub fn parse_workplace_type(text: &str) -> Option<WorkplaceType> {
    let t = text.to_lowercase();
    if t.contains("remote") || t.contains("zdalna") {
        Some(WorkplaceType::Remote)
    } else if t.contains("hybrid") || t.contains("hybryda") {
        Some(WorkplaceType::Hybrid)
    } else if t.contains("office") || t.contains("biuro") || t.contains("stacjonarna") {
        Some(WorkplaceType::Office)
    } else {
        None
    }
}

pub fn parse_experience_level(text: &str) -> Option<ExperienceLevel> {
    let t = text.to_lowercase();
    if t.contains("junior") || t.contains("młodszy") {
        Some(ExperienceLevel::Junior)
    } else if t.contains("senior") || t.contains("starszy") {
        Some(ExperienceLevel::Senior)
    } else if t.contains("mid") || t.contains("regular") {
        Some(ExperienceLevel::Mid)
    } else {
        None
    }
}

/// Map a schema.org `employmentType` keyword list onto the enum. The bare
/// "time" keyword is checked last so `PART_TIME` resolves to part-time
/// rather than being swallowed by the full-time catch-all.
pub fn parse_working_time(text: &str) -> Option<WorkingTime> {
    let t = text.to_lowercase();
    if t.contains("full") {
        Some(WorkingTime::FullTime)
    } else if t.contains("part") {
        Some(WorkingTime::PartTime)
    } else if t.contains("intern") {
        Some(WorkingTime::Internship)
    } else if t.contains("freelance") || t.contains("contract") {
        Some(WorkingTime::Freelance)
    } else if t.contains("time") {
        Some(WorkingTime::FullTime)
    } else {
        None
    }
}

/// Split a displayed location like "Warszawa, Prosta 51" into city/street.
pub fn parse_location_text(text: &str) -> JobLocation {
    let mut parts = text.splitn(2, ',').map(|p| p.trim());
    let city = parts.next().unwrap_or("").to_string();
    let street = parts.next().filter(|s| !s.is_empty()).map(String::from);
    JobLocation {
        city,
        street,
        remote: None,
        hybrid: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_drops_scripts_and_collapses_whitespace() {
        let html = r#"<html><head><style>.x{color:red}</style></head>
            <body><h1>Backend   Developer</h1>
            <script>var x = "<b>ignored</b>";</script>
            <p>Remote   role</p></body></html>"#;
        let text = strip_html(html);
        assert_eq!(text, "Backend Developer Remote role");
    }

    #[test]
    fn salary_text_with_grouped_digits() {
        let s = parse_salary_text("15 000 - 20 000 pln brutto").unwrap();
        assert_eq!(s.from, Some(15_000.0));
        assert_eq!(s.to, Some(20_000.0));
        assert_eq!(s.currency, "PLN");
        assert_eq!(s.gross, Some(true));
    }

    #[test]
    fn salary_text_without_range_is_none() {
        assert!(parse_salary_text("competitive salary").is_none());
    }

    #[test]
    fn workplace_keywords_cover_polish_labels() {
        assert_eq!(parse_workplace_type("Praca zdalna"), Some(WorkplaceType::Remote));
        assert_eq!(parse_workplace_type("Hybryda"), Some(WorkplaceType::Hybrid));
        assert_eq!(parse_workplace_type("Praca stacjonarna"), Some(WorkplaceType::Office));
        assert_eq!(parse_workplace_type("whatever"), None);
    }

    #[test]
    fn experience_keywords_cover_polish_labels() {
        assert_eq!(parse_experience_level("Młodszy specjalista"), Some(ExperienceLevel::Junior));
        assert_eq!(parse_experience_level("Starszy inżynier"), Some(ExperienceLevel::Senior));
        assert_eq!(parse_experience_level("Mid/Regular"), Some(ExperienceLevel::Mid));
    }

    #[test]
    fn working_time_from_employment_type() {
        assert_eq!(parse_working_time("FULL_TIME"), Some(WorkingTime::FullTime));
        assert_eq!(parse_working_time("PART_TIME"), Some(WorkingTime::PartTime));
        assert_eq!(parse_working_time("INTERNSHIP"), Some(WorkingTime::Internship));
        assert_eq!(parse_working_time("CONTRACTOR"), Some(WorkingTime::Freelance));
        // bare "time" only resolves full-time when no specific keyword hits
        assert_eq!(parse_working_time("flexible time"), Some(WorkingTime::FullTime));
        assert_eq!(parse_working_time("seasonal"), None);
    }

    #[test]
    fn location_splits_city_and_street() {
        let loc = parse_location_text("Warszawa, Prosta 51");
        assert_eq!(loc.city, "Warszawa");
        assert_eq!(loc.street.as_deref(), Some("Prosta 51"));

        let bare = parse_location_text("Kraków");
        assert_eq!(bare.city, "Kraków");
        assert!(bare.street.is_none());
    }
}
