//! Page-level helpers shared by the portal scrapers: navigation with a
//! timeout, best-effort selector waits, consent-banner dismissal, and
//! cookie injection.

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::Page;
use tracing::{debug, warn};

use crate::core::config::CookieSpec;
use crate::core::error::ScrapeError;

/// Navigate and wait for the load event, bounded by `timeout`.
pub async fn navigate_with_timeout(
    page: &Page,
    url: &str,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    let nav = async {
        page.goto(url)
            .await
            .map_err(|e| ScrapeError::Network(format!("navigation to {url} failed: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Render(format!("load event never fired for {url}: {e}")))?;
        Ok::<(), ScrapeError>(())
    };
    tokio::time::timeout(timeout, nav)
        .await
        .map_err(|_| ScrapeError::Timeout {
            seconds: timeout.as_secs(),
        })?
}

/// Poll for `selector` to appear, up to `timeout`. Best-effort: a page that
/// never renders the element is still scrapeable, so this only reports
/// whether the element showed up.
pub async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    let expr = format!("document.querySelector({:?}) !== null", selector);
    loop {
        let found = page
            .evaluate(expr.as_str())
            .await
            .ok()
            .and_then(|v| v.into_value::<bool>().ok())
            .unwrap_or(false);
        if found {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            debug!("selector {selector} never appeared");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// Evaluate a JS expression on the page and deserialize the result.
pub async fn eval_json(page: &Page, expr: &str) -> Option<serde_json::Value> {
    page.evaluate(expr)
        .await
        .ok()
        .and_then(|v| v.into_value::<serde_json::Value>().ok())
}

/// Grab the serialized DOM after rendering.
pub async fn page_content(page: &Page) -> Result<String, ScrapeError> {
    page.content()
        .await
        .map_err(|e| ScrapeError::Render(format!("failed to read page content: {e}")))
}

/// Inject cookies (consent, auth) before navigation via `Network.setCookies`.
pub async fn inject_cookies(page: &Page, cookies: &[CookieSpec]) {
    if cookies.is_empty() {
        return;
    }
    let params: Vec<CookieParam> = cookies
        .iter()
        .filter_map(|c| {
            serde_json::from_value::<CookieParam>(serde_json::json!({
                "name": c.name,
                "value": c.value,
                "domain": c.domain,
                "path": "/",
            }))
            .ok()
        })
        .collect();
    if params.is_empty() {
        return;
    }
    if let Err(e) = page.execute(SetCookiesParams::new(params)).await {
        warn!("cookie injection failed: {e}");
    }
}

/// Selectors of the consent buttons seen on the supported portals.
const COOKIE_BANNER_SELECTORS: &[&str] = &[
    r#"[data-test="button-acceptAll"]"#,
    "#onetrust-accept-btn-handler",
    ".cookie-accept",
    ".accept-cookies",
];

const COOKIE_BANNER_LABELS: &[&str] = &["Akceptuj", "Accept", "Zgadzam się", "Agree"];

/// Click through any consent banner blocking the content. Best-effort, each
/// attempt swallows its own failure.
pub async fn dismiss_cookie_banners(page: &Page) {
    for selector in COOKIE_BANNER_SELECTORS {
        let expr = format!(
            "(() => {{ const el = document.querySelector({:?}); if (el) {{ el.click(); return true; }} return false; }})()",
            selector
        );
        if page
            .evaluate(expr.as_str())
            .await
            .ok()
            .and_then(|v| v.into_value::<bool>().ok())
            .unwrap_or(false)
        {
            debug!("dismissed cookie banner via {selector}");
            tokio::time::sleep(Duration::from_millis(300)).await;
            return;
        }
    }

    // Fall back to matching the visible button label.
    let labels = serde_json::to_string(COOKIE_BANNER_LABELS).unwrap_or_default();
    let expr = format!(
        "(() => {{ const labels = {labels}; \
         for (const b of document.querySelectorAll('button')) {{ \
           const t = (b.textContent || '').trim(); \
           if (labels.some(l => t.includes(l))) {{ b.click(); return true; }} \
         }} return false; }})()"
    );
    if page
        .evaluate(expr.as_str())
        .await
        .ok()
        .and_then(|v| v.into_value::<bool>().ok())
        .unwrap_or(false)
    {
        debug!("dismissed cookie banner via button label");
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
}
