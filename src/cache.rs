//! Result cache keyed by normalized URL. Entries expire lazily: expiry is
//! checked at read time against the entry's insertion instant, so a stale
//! entry is evicted on the first lookup after its TTL passes.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use tracing::debug;

use crate::core::types::{CacheStats, ScrapedJob};

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_ENTRIES: u64 = 10_000;

#[derive(Clone)]
struct CacheEntry {
    job: ScrapedJob,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JobCache {
    entries: Cache<String, CacheEntry>,
    ttl: TimeDelta,
}

impl JobCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().max_capacity(MAX_ENTRIES).build(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Fresh entry for `key`, or `None`. A stale entry is evicted here.
    pub async fn get(&self, key: &str) -> Option<ScrapedJob> {
        let entry = self.entries.get(key).await?;
        if Utc::now() - entry.created_at > self.ttl {
            debug!("cache entry expired: {key}");
            self.entries.invalidate(key).await;
            return None;
        }
        Some(entry.job)
    }

    pub async fn insert(&self, key: String, job: ScrapedJob) {
        self.entries
            .insert(
                key,
                CacheEntry {
                    job,
                    created_at: Utc::now(),
                },
            )
            .await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        let keys: Vec<String> = self.entries.iter().map(|(k, _)| k.as_ref().clone()).collect();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}

impl Default for JobCache {
    fn default() -> Self {
        Self::new()
    }
}
