use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::app_config::{CacheBackend, Config, PipelineDiscovery};
use crate::database::Repository;
use crate::language_utils;
use crate::providers::{
    Bhashini, PipelineProvider, PipelineResolver, SearchPipelineResolver, StaticPipelineResolver,
};
use crate::server::{self, AppState};
use crate::translation::{CacheStats, CacheStore, MemoryCache, TranslationService};

/// Main application controller: wires config, cache, provider and service
pub struct Controller {
    /// App configuration
    config: Config,

    /// Orchestrator shared by every command
    service: TranslationService,

    /// SQLite repository, when that backend is in use
    repository: Option<Repository>,
}

impl Controller {
    /// Build every component from a validated configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        if !config.provider.has_credentials() {
            warn!("BHASHINI_USER_ID / BHASHINI_API_KEY are not set; cache misses will fail");
        }

        let (cache, repository): (Arc<dyn CacheStore>, Option<Repository>) =
            match config.cache.backend {
                CacheBackend::Sqlite => {
                    let repository = match &config.cache.database_path {
                        Some(path) => Repository::new(crate::database::DatabaseConnection::new(path)?),
                        None => Repository::new_default()?,
                    };
                    info!(
                        "Using SQLite translation cache at {}",
                        repository.connection().path().display()
                    );
                    (Arc::new(repository.clone()), Some(repository))
                }
                CacheBackend::Memory => {
                    info!("Using in-memory translation cache");
                    (Arc::new(MemoryCache::new()), None)
                }
            };

        let client = Arc::new(Bhashini::with_timeout(
            config.provider.base_url.clone(),
            config.provider.user_id.clone(),
            config.provider.api_key.clone(),
            config.provider_timeout(),
        )?);

        let resolver: Arc<dyn PipelineResolver> = match config.provider.discovery {
            PipelineDiscovery::Static => Arc::new(StaticPipelineResolver::new(
                config.provider.known_pipelines.clone(),
            )),
            PipelineDiscovery::Search => Arc::new(SearchPipelineResolver::new(client.clone())),
        };

        let provider: Arc<dyn PipelineProvider> = client;
        let service = TranslationService::new(
            provider,
            resolver,
            cache,
            config.pipeline_id.clone(),
            config.cache_ttl(),
        );

        debug!("Controller initialized: {:?}", service);

        Ok(Self {
            config,
            service,
            repository,
        })
    }

    /// Controller around an already built service (no SQLite maintenance)
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self {
            config,
            service,
            repository: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Shared state for the HTTP server
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.service.clone()))
    }

    /// Run the HTTP server until interrupted
    pub async fn serve(&self) -> Result<()> {
        let address = self.config.server.address();
        info!(
            "Starting translation service (pipeline {}, cache TTL {}s)",
            self.service.active_pipeline_id(),
            self.service.cache_ttl().as_secs()
        );
        server::serve(self.app_state(), &address).await
    }

    /// Translate one text from the command line
    pub async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        language_utils::validate_language_code(source_lang).context("Invalid source language")?;
        language_utils::validate_language_code(target_lang).context("Invalid target language")?;

        let translated = self.service.translate(text, source_lang, target_lang).await?;
        Ok(translated)
    }

    /// Remove expired entries, or every entry when `all` is set
    pub async fn clean_cache(&self, all: bool) -> Result<u64> {
        let removed = if all {
            let repository = self
                .repository
                .as_ref()
                .ok_or_else(|| anyhow!("Clearing the whole cache requires the SQLite backend"))?;
            repository.clear_cache().await?
        } else {
            self.service.clean_expired_cache().await?
        };

        if let Some(repository) = &self.repository {
            if removed > 0 {
                let repository = repository.clone();
                tokio::task::spawn_blocking(move || repository.connection().vacuum())
                    .await
                    .context("Vacuum task failed")??;
            }
        }

        Ok(removed)
    }

    /// Entry counts of the cache
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        Ok(self.service.cache_stats().await?)
    }
}
