/*!
 * Core translation service implementation.
 *
 * `TranslationService` is the cache-aside coordinator: it checks the cache,
 * on a miss resolves the pipeline configuration (falling back once to an
 * alternate pipeline), calls the remote pipeline and writes the result back.
 */

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use super::cache::{CacheLookup, CacheStats, CacheStore};
use super::truncate_text;
use crate::errors::{StoreError, TranslationError};
use crate::providers::{PipelineConfig, PipelineProvider, PipelineResolver};

/// Default lifetime of a cached translation
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Main translation service
///
/// Cloning is cheap and clones share the active pipeline id, so one fallback
/// is seen by every request handled by the same service.
#[derive(Clone)]
pub struct TranslationService {
    /// Remote pipeline client
    provider: Arc<dyn PipelineProvider>,

    /// Source of replacement pipeline ids
    resolver: Arc<dyn PipelineResolver>,

    /// Translation cache
    cache: Arc<dyn CacheStore>,

    /// Pipeline tried first; replaced on fallback
    active_pipeline_id: Arc<RwLock<String>>,

    /// Lifetime of entries written by this service
    cache_ttl: Duration,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider)
            .field("resolver", &self.resolver)
            .field("active_pipeline_id", &*self.active_pipeline_id.read())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(
        provider: Arc<dyn PipelineProvider>,
        resolver: Arc<dyn PipelineResolver>,
        cache: Arc<dyn CacheStore>,
        pipeline_id: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            resolver,
            cache,
            active_pipeline_id: Arc::new(RwLock::new(pipeline_id.into())),
            cache_ttl,
        }
    }

    /// Pipeline id the next cache miss will try first
    pub fn active_pipeline_id(&self) -> String {
        self.active_pipeline_id.read().clone()
    }

    /// Lifetime of cache entries written by this service
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Translate a single text, serving it from the cache when possible
    pub async fn translate(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let text = source_text.trim();
        if text.is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        match self.cache.get(text, source_lang, target_lang).await {
            CacheLookup::Hit(translated) => {
                debug!(
                    "Cache hit for '{}' ({} -> {})",
                    truncate_text(text, 40),
                    source_lang,
                    target_lang
                );
                return Ok(translated);
            }
            CacheLookup::Miss => {
                debug!(
                    "Cache miss for '{}' ({} -> {})",
                    truncate_text(text, 40),
                    source_lang,
                    target_lang
                );
            }
            CacheLookup::Unavailable(reason) => {
                warn!("Cache unavailable, treating as miss: {}", reason);
            }
        }

        let config = self.resolve_config(source_lang, target_lang).await?;

        let translated = self
            .provider
            .execute(&config, text, source_lang, target_lang)
            .await
            .map_err(|e| {
                error!("Translation {} -> {} failed: {}", source_lang, target_lang, e);
                TranslationError::TranslationFailed(e)
            })?;

        if let Err(e) = self
            .cache
            .put(text, source_lang, target_lang, &translated, self.cache_ttl)
            .await
        {
            warn!("Failed to cache translation: {}", e);
        }

        Ok(translated)
    }

    /// Fetch the config of the active pipeline, falling back once to a resolved one
    async fn resolve_config(
        &self,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PipelineConfig, TranslationError> {
        let pipeline_id = self.active_pipeline_id();

        let first_error = match self
            .provider
            .fetch_config(&pipeline_id, source_lang, target_lang)
            .await
        {
            Ok(config) => return Ok(config),
            Err(e) => e,
        };

        warn!(
            "Pipeline '{}' could not be configured ({}), trying a fallback pipeline",
            pipeline_id, first_error
        );

        let fallback_id = match self.resolver.resolve_pipeline().await {
            Ok(id) => id,
            Err(e) => {
                error!("Fallback pipeline resolution failed: {}", e);
                return Err(TranslationError::PipelineUnavailable(first_error));
            }
        };

        info!("Switching active pipeline to '{}'", fallback_id);
        *self.active_pipeline_id.write() = fallback_id.clone();

        self.provider
            .fetch_config(&fallback_id, source_lang, target_lang)
            .await
            .map_err(|e| {
                error!("Fallback pipeline '{}' failed as well: {}", fallback_id, e);
                TranslationError::PipelineUnavailable(e)
            })
    }

    /// Remove expired cache entries, returning how many were deleted
    pub async fn clean_expired_cache(&self) -> Result<u64, StoreError> {
        let removed = self.cache.sweep_expired().await?;
        info!("Removed {} expired cache entries", removed);
        Ok(removed)
    }

    /// Entry counts of the underlying cache
    pub async fn cache_stats(&self) -> Result<CacheStats, StoreError> {
        self.cache.stats().await
    }
}
