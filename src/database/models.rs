/*!
 * Database entity models.
 *
 * These structures map directly to the translation cache table and provide
 * type-safe access to persisted data.
 */

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// A cached translation row
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Row identifier (UUID v4)
    pub id: String,
    /// Original source text (already trimmed by the caller)
    pub source_text: String,
    /// SHA256 hash of source text, used for indexing
    pub source_text_hash: String,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Translated text
    pub translated_text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry that expires `ttl` from now
    pub fn new(
        source_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        translated_text: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self::with_timestamps(
            source_text,
            source_lang,
            target_lang,
            translated_text,
            now,
            expires_at,
        )
    }

    /// Create an entry with explicit timestamps
    pub fn with_timestamps(
        source_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        translated_text: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let source_text = source_text.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_text_hash: hash_text(&source_text),
            source_text,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            translated_text: translated_text.into(),
            created_at,
            expires_at,
        }
    }

    /// Whether the entry has expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Compute SHA256 hash of text
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Timestamps are stored as milliseconds since the Unix epoch, so SQL
/// comparisons are numeric over the whole range chrono can represent.
pub fn to_db_timestamp(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert a stored timestamp back
pub fn from_db_timestamp(millis: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", millis))
}
