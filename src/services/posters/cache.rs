use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::MovieId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Poster(MovieId),
    TitleSearch(String),
}

impl CacheKey {
    /// Title keys are case-insensitive
    pub fn title_search(title: &str) -> Self {
        CacheKey::TitleSearch(title.trim().to_lowercase())
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Poster(id) => write!(f, "poster:{}", id),
            CacheKey::TitleSearch(title) => write!(f, "search:{}", title),
        }
    }
}

struct CacheEntry {
    /// `None` records a lookup that found no poster
    value: Option<String>,
    expires_at: DateTime<Utc>,
}

/// In-memory TTL cache of poster lookups, shared between clones.
///
/// Misses are cached too, so a movie without a poster is not looked up
/// again until its entry expires.
#[derive(Clone)]
pub struct PosterCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    ttl: chrono::Duration,
}

impl PosterCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Outer `None` is a cache miss; inner `None` is a cached absence
    pub async fn get(&self, key: &CacheKey) -> Option<Option<String>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        tracing::debug!(key = %key, "Poster cache hit");
        Some(entry.value.clone())
    }

    pub async fn insert(&self, key: CacheKey, value: Option<String>) {
        let expires_at = Utc::now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Drops expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Purges expired entries every `every` until the runtime shuts down
    pub fn spawn_purger(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired poster cache entries");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
