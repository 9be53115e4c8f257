use url::Url;

/// Canonical form used as the cache key and stamped into `sourceUrl`:
/// scheme + host + path, query and fragment dropped, no trailing slash.
/// Unparseable input comes back unchanged so callers never have to branch.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("");
            let mut normalized = format!("{}://{}{}", url.scheme(), host, url.path());
            while normalized.ends_with('/') && normalized.len() > url.scheme().len() + 3 {
                normalized.pop();
            }
            normalized
        }
        Err(_) => raw.to_string(),
    }
}

/// Registrable host with any leading `www.` stripped, lowercased.
/// Unparseable input yields an empty string, which matches no registry entry.
pub fn extract_domain(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("").to_ascii_lowercase();
            host.strip_prefix("www.").unwrap_or(&host).to_string()
        }
        Err(_) => String::new(),
    }
}
