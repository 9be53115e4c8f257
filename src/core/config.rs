use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// JoblensConfig — file-based config loader (joblens.json) with env-var fallback
// ---------------------------------------------------------------------------

/// AI extraction sub-config (mirrors the `ai` key in joblens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct AiConfig {
    /// LLM endpoint, e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1` (Ollama).
    pub base_url: Option<String>,
    /// API key. Never logged. Leave blank for key-less local endpoints.
    pub api_key: Option<String>,
    /// Model name, e.g. `gpt-5-nano`, `gpt-4o-mini`, `llama3`.
    pub model: Option<String>,
    /// Reader endpoint used to turn pages into LLM-friendly markdown.
    pub reader_base_url: Option<String>,
    /// Seconds the reader call may take; also forwarded to the reader
    /// endpoint. Default: 60.
    pub reader_timeout_secs: Option<u64>,
    /// Maximum characters of page text fed to the LLM. Default: 50000.
    pub max_input_chars: Option<usize>,
    /// Minimum characters the reader must return before the LLM is invoked.
    /// Shorter bodies are treated as a failed fetch. Default: 100.
    pub min_content_chars: Option<usize>,
}

impl AiConfig {
    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// An explicit empty string in the config file means "no key required"
    /// (Ollama / LM Studio); extraction proceeds without auth.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.trim().to_string());
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.trim().is_empty())
    }

    /// LLM base URL: JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// Model name: JSON field → `JOBLENS_AI_MODEL` env var → `gpt-5-nano`.
    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var("JOBLENS_AI_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "gpt-5-nano".to_string())
    }

    /// Reader base URL: JSON field → `JOBLENS_READER_BASE_URL` env var → `https://r.jina.ai`.
    pub fn resolve_reader_base_url(&self) -> String {
        if let Some(u) = &self.reader_base_url {
            if !u.trim().is_empty() {
                return u.trim_end_matches('/').to_string();
            }
        }
        std::env::var("JOBLENS_READER_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://r.jina.ai".to_string())
    }

    /// Reader timeout: JSON field → `JOBLENS_READER_TIMEOUT_SECS` env var → 60.
    pub fn resolve_reader_timeout_secs(&self) -> u64 {
        if let Some(n) = self.reader_timeout_secs {
            return n;
        }
        std::env::var("JOBLENS_READER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60)
    }

    pub fn resolve_max_input_chars(&self) -> usize {
        self.max_input_chars.unwrap_or(50_000)
    }

    pub fn resolve_min_content_chars(&self) -> usize {
        self.min_content_chars.unwrap_or(100)
    }
}

/// Top-level config loaded from `joblens.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct JoblensConfig {
    #[serde(default)]
    pub ai: AiConfig,
}

/// Load `joblens.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `JOBLENS_CONFIG` env var path
/// 2. `./joblens.json` (process cwd)
/// 3. `../joblens.json` (one level up, repo root during `cargo run`)
///
/// Missing file → `JoblensConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `JoblensConfig::default()`.
pub fn load_config() -> JoblensConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("joblens.json"),
            std::path::PathBuf::from("../joblens.json"),
        ];
        if let Ok(env_path) = std::env::var("JOBLENS_CONFIG") {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<JoblensConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("joblens.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "joblens.json parse error at {}: {}, using defaults",
                        path.display(),
                        e
                    );
                    return JoblensConfig::default();
                }
            },
            Err(_) => continue, // not found at this path, try next
        }
    }

    JoblensConfig::default()
}

// ---------------------------------------------------------------------------

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see `scraping::browser::find_chrome_executable`).
/// Only returns a value when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

/// Headless-browser knobs shared by every portal scraper.
#[derive(Clone, Debug)]
pub struct ScraperConfig {
    pub headless: bool,
    pub timeout: Duration,
    /// Fixed user agent; `None` picks a random desktop UA per page.
    pub user_agent: Option<String>,
    /// Cookies injected before navigation (consent cookies, auth).
    pub cookies: Vec<CookieSpec>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub domain: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(30),
            user_agent: None,
            cookies: Vec::new(),
        }
    }
}
