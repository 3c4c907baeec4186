/*!
 * Repository layer for translation cache operations.
 *
 * This module provides a high-level API over the `translation_cache` table,
 * abstracting away the SQL details, and implements the `CacheStore` contract
 * used by the translation orchestrator.
 */

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, OptionalExtension};
use std::time::Duration;

use super::connection::DatabaseConnection;
use super::models::{from_db_timestamp, hash_text, to_db_timestamp, CacheEntry};
use crate::errors::StoreError;
use crate::translation::cache::{CacheLookup, CacheStats, CacheStore};

/// Repository for translation cache rows
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Get the most recent live translation for the key
    pub async fn get_cached_translation(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>> {
        let source_text_hash = hash_text(source_text);
        let source_text = source_text.to_string();
        let source_lang = source_lang.to_string();
        let target_lang = target_lang.to_string();
        let now = to_db_timestamp(Utc::now());

        self.db
            .execute_async(move |conn| {
                let result: Option<String> = conn
                    .query_row(
                        r#"
                        SELECT translated_text
                        FROM translation_cache
                        WHERE source_text_hash = ?1
                          AND source_text = ?2
                          AND source_lang = ?3
                          AND target_lang = ?4
                          AND expires_at > ?5
                        ORDER BY created_at DESC
                        LIMIT 1
                        "#,
                        params![source_text_hash, source_text, source_lang, target_lang, now],
                        |row| row.get(0),
                    )
                    .optional()?;

                Ok(result)
            })
            .await
    }

    /// Insert or replace a cache entry
    ///
    /// On conflict the existing row keeps its id and takes the new text and
    /// both new timestamps.
    pub async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()> {
        let entry = entry.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_cache (
                        id, source_text_hash, source_text, source_lang, target_lang,
                        translated_text, created_at, expires_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(source_text_hash, source_lang, target_lang)
                    DO UPDATE SET
                        source_text = excluded.source_text,
                        translated_text = excluded.translated_text,
                        created_at = excluded.created_at,
                        expires_at = excluded.expires_at
                    "#,
                    params![
                        entry.id,
                        entry.source_text_hash,
                        entry.source_text,
                        entry.source_lang,
                        entry.target_lang,
                        entry.translated_text,
                        to_db_timestamp(entry.created_at),
                        to_db_timestamp(entry.expires_at),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Store a translation that expires `ttl` from now
    pub async fn cache_translation(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        translated_text: &str,
        ttl: Duration,
    ) -> Result<()> {
        let entry = CacheEntry::new(source_text, source_lang, target_lang, translated_text, ttl);
        self.upsert_entry(&entry).await
    }

    /// Fetch every row stored for the key, live or expired
    pub async fn find_entries(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<CacheEntry>> {
        let source_text_hash = hash_text(source_text);
        let source_lang = source_lang.to_string();
        let target_lang = target_lang.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, source_text, source_text_hash, source_lang, target_lang,
                           translated_text, created_at, expires_at
                    FROM translation_cache
                    WHERE source_text_hash = ?1 AND source_lang = ?2 AND target_lang = ?3
                    ORDER BY created_at DESC
                    "#,
                )?;

                let rows = stmt.query_map(
                    params![source_text_hash, source_lang, target_lang],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, String>(5)?,
                            row.get::<_, i64>(6)?,
                            row.get::<_, i64>(7)?,
                        ))
                    },
                )?;

                let mut entries = Vec::new();
                for row in rows {
                    let (id, source_text, source_text_hash, source_lang, target_lang, translated_text, created_at, expires_at) = row?;
                    entries.push(CacheEntry {
                        id,
                        source_text,
                        source_text_hash,
                        source_lang,
                        target_lang,
                        translated_text,
                        created_at: from_db_timestamp(created_at)?,
                        expires_at: from_db_timestamp(expires_at)?,
                    });
                }

                Ok(entries)
            })
            .await
    }

    /// Delete entries whose expiry is at or before `now`
    pub async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64> {
        let now = to_db_timestamp(now);

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM translation_cache WHERE expires_at <= ?1",
                    [now],
                )?;
                Ok(deleted as u64)
            })
            .await
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        let now = to_db_timestamp(Utc::now());

        self.db
            .execute_async(move |conn| {
                let (total, live): (i64, i64) = conn.query_row(
                    r#"
                    SELECT COUNT(*),
                           COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0)
                    FROM translation_cache
                    "#,
                    [now],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                Ok(CacheStats {
                    total_entries: total as u64,
                    live_entries: live as u64,
                    expired_entries: (total - live) as u64,
                })
            })
            .await
    }

    /// Clear the translation cache
    pub async fn clear_cache(&self) -> Result<u64> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translation_cache", [])?;
                Ok(deleted as u64)
            })
            .await
    }
}

#[async_trait]
impl CacheStore for Repository {
    async fn get(&self, source_text: &str, source_lang: &str, target_lang: &str) -> CacheLookup {
        match self
            .get_cached_translation(source_text, source_lang, target_lang)
            .await
        {
            Ok(Some(text)) => {
                debug!("Cache hit for translation ({} -> {})", source_lang, target_lang);
                CacheLookup::Hit(text)
            }
            Ok(None) => CacheLookup::Miss,
            Err(e) => CacheLookup::Unavailable(format!("{:#}", e)),
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
        self.cache_translation(source_text, source_lang, target_lang, translated_text, ttl)
            .await
            .map_err(StoreError::from)
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let removed = self.delete_expired_before(Utc::now()).await?;
        info!("Removed {} expired translation cache entries", removed);
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, StoreError> {
        Ok(self.get_cache_stats().await?)
    }
}
