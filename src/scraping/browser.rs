//! Native browser management using `chromiumoxide`.
//!
//! Single source of truth for:
//! * Finding a usable browser executable (Brave → Chrome → Chromium, cross-platform).
//! * `BrowserPool` — shared persistent browser instance with tab reuse.
//! * Building a headless `BrowserConfig` with sensible flags.

use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::error::ScrapeError;

// ── Realistic User-Agent pool ────────────────────────────────────────────────

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox 133 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan – finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = crate::core::config::chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "brave-browser",
            "brave",
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/brave-browser",
            "/usr/bin/brave",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

/// Returns `true` when a usable browser binary is present on this machine.
pub fn native_browser_available() -> bool {
    find_chrome_executable().is_some()
}

// ── Headless browser config builder ──────────────────────────────────────────

/// Build a `BrowserConfig` for headless operation.
///
/// Flags chosen for compatibility with CI / restricted environments
/// (`--no-sandbox`, `--disable-dev-shm-usage`) and a non-automation UA.
pub fn build_headless_config(
    exe: &str,
    user_agent: Option<&str>,
    width: u32,
    height: u32,
) -> Result<BrowserConfig, ScrapeError> {
    let ua = user_agent.unwrap_or_else(|| random_user_agent());

    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox") // often required in CI / restricted environments
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--disable-crash-reporter")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", ua))
        .build()
        .map_err(|e| ScrapeError::Render(format!("failed to build browser config: {e}")))
}

// ── Browser pool (tab reuse) ─────────────────────────────────────────────────

/// A shared, long-lived browser instance that reuses tabs per request.
///
/// Instead of launching/destroying a full browser on every scrape (slow),
/// `BrowserPool` keeps one browser alive and opens a fresh tab per request.
/// If the browser crashes, the next `acquire()` restarts it transparently.
pub struct BrowserPool {
    exe: String,
    user_agent: Option<String>,
    inner: Mutex<Option<Browser>>,
}

impl BrowserPool {
    /// Create a pool for the given executable. Browser is lazy-started.
    pub fn new(exe: impl Into<String>, user_agent: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            exe: exe.into(),
            user_agent,
            inner: Mutex::new(None),
        })
    }

    /// Create a pool using the auto-discovered executable.
    /// Returns `None` if no browser is installed on this machine.
    pub fn new_auto(user_agent: Option<String>) -> Option<Arc<Self>> {
        find_chrome_executable().map(|exe| Self::new(exe, user_agent))
    }

    /// Acquire a fresh tab from the persistent browser.
    ///
    /// * Lazy-starts the browser on first call.
    /// * Restarts transparently if the process has crashed.
    /// * Close the returned `Page` when done — the browser stays alive.
    pub async fn acquire(&self) -> Result<Page, ScrapeError> {
        let mut guard = self.inner.lock().await;

        // Probe: opening a blank tab tells us whether the process is alive.
        let alive = match guard.as_mut() {
            Some(b) => b.new_page("about:blank").await.is_ok(),
            None => false,
        };

        if !alive {
            if guard.is_some() {
                warn!("browser pool: instance dead, restarting");
                if let Some(mut old) = guard.take() {
                    let _ = old.close().await;
                }
            }
            info!("browser pool: launching new instance ({})", self.exe);
            let config = build_headless_config(&self.exe, self.user_agent.as_deref(), 1920, 1080)?;
            let (new_browser, mut handler) = Browser::launch(config).await.map_err(|e| {
                ScrapeError::Render(format!("failed to launch browser ({}): {e}", self.exe))
            })?;
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        warn!("browser pool CDP handler error: {}", e);
                    }
                }
            });
            *guard = Some(new_browser);
        }

        let b = guard.as_mut().expect("browser present after init");
        b.new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to open tab: {e}")))
    }

    /// Gracefully close the pooled browser instance. Idempotent.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(mut b) = guard.take() {
            let _ = b.close().await;
            info!("browser pool shut down");
        }
    }
}
