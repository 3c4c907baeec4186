/*!
 * Translation cache contract and in-memory backend.
 *
 * `CacheStore` is the key-value-with-expiry store the orchestrator reads
 * before calling the remote pipeline and writes back to on a miss. Entries
 * are keyed by (source text, source language, target language). The SQLite
 * implementation lives in `database::repository`; `MemoryCache` here keeps
 * entries in process memory.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StoreError;
use super::truncate_text;

/// Outcome of a cache read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A live entry exists for the key
    Hit(String),
    /// No live entry exists for the key
    Miss,
    /// The store could not be queried
    Unavailable(String),
}

impl CacheLookup {
    /// The cached text, if this is a hit
    pub fn into_hit(self) -> Option<String> {
        match self {
            Self::Hit(text) => Some(text),
            _ => None,
        }
    }
}

/// Counters describing the cache contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries physically present
    pub total_entries: u64,
    /// Entries that have not expired
    pub live_entries: u64,
    /// Entries waiting for the next sweep
    pub expired_entries: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache entries: {} ({} live, {} expired)",
            self.total_entries, self.live_entries, self.expired_entries
        )
    }
}

/// Persistent translation cache with per-entry expiry
///
/// Implementations must never return an entry whose expiry has passed, even
/// if it is still physically present, and must upsert on `put` so there is at
/// most one entry per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live translation for the key
    async fn get(&self, source_text: &str, source_lang: &str, target_lang: &str) -> CacheLookup;

    /// Insert or replace the translation for the key, expiring `ttl` from now
    async fn put(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        translated_text: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Delete every entry whose expiry has passed, returning how many were removed
    async fn sweep_expired(&self) -> Result<u64, StoreError>;

    /// Report entry counts
    async fn stats(&self) -> Result<CacheStats, StoreError>;
}

/// Cache key combining source text, source language, and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    source_lang: String,
    target_lang: String,
}

impl CacheKey {
    fn new(source_text: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    translated_text: String,
    expires_at: DateTime<Utc>,
}

/// In-process translation cache
#[derive(Clone, Default)]
pub struct MemoryCache {
    /// Internal cache storage
    entries: Arc<RwLock<HashMap<CacheKey, MemoryEntry>>>,

    /// Cache hit counter
    hits: Arc<AtomicUsize>,

    /// Cache miss counter
    misses: Arc<AtomicUsize>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry with an explicit expiry instant
    pub fn insert_with_expiry(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        translated_text: &str,
        expires_at: DateTime<Utc>,
    ) {
        let key = CacheKey::new(source_text, source_lang, target_lang);
        self.entries.write().insert(
            key,
            MemoryEntry {
                translated_text: translated_text.to_string(),
                expires_at,
            },
        );
    }

    /// Hits, misses and hit rate since creation
    pub fn hit_stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries physically present
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, source_text: &str, source_lang: &str, target_lang: &str) -> CacheLookup {
        let key = CacheKey::new(source_text, source_lang, target_lang);
        let now = Utc::now();

        let found = self
            .entries
            .read()
            .get(&key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.translated_text.clone());

        match found {
            Some(text) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Memory cache hit for '{}' ({} -> {})",
                    truncate_text(source_text, 30),
                    source_lang,
                    target_lang
                );
                CacheLookup::Hit(text)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Miss
            }
        }
    }

    async fn put(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        translated_text: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.insert_with_expiry(source_text, source_lang, target_lang, translated_text, expires_at);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = (before - entries.len()) as u64;

        debug!("Swept {} expired entries from memory cache", removed);
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, StoreError> {
        let now = Utc::now();
        let entries = self.entries.read();
        let live = entries.values().filter(|e| e.expires_at > now).count() as u64;
        let total = entries.len() as u64;

        Ok(CacheStats {
            total_entries: total,
            live_entries: live,
            expired_entries: total - live,
        })
    }
}
