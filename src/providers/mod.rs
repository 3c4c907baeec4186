/*!
 * Remote pipeline provider clients.
 *
 * A pipeline is a provider-hosted bundle of model/service configuration. Using
 * one takes two calls: fetch its runtime configuration (inference endpoint,
 * auth header, per-language-pair service ids), then execute a translation
 * against the returned endpoint.
 *
 * - `bhashini`: client for the Bhashini/ULCA pipeline API
 * - `resolver`: strategies for picking a pipeline identifier
 * - `mock`: in-process providers for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod bhashini;
pub mod mock;
pub mod resolver;

pub use bhashini::Bhashini;
pub use resolver::{SearchPipelineResolver, StaticPipelineResolver};

/// Task type used for every request this crate makes
pub const TRANSLATION_TASK: &str = "translation";

/// A language pair served by a specific provider service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Provider-assigned service identifier
    pub service_id: String,
}

impl ServiceEntry {
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            service_id: service_id.into(),
        }
    }
}

/// Runtime configuration of a pipeline, fetched fresh for every call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Inference endpoint the translation is posted to
    pub endpoint_url: String,
    /// Name of the auth header expected by the endpoint
    pub auth_header_name: String,
    /// Value of the auth header
    pub auth_header_value: String,
    /// Translation services in the order the provider listed them
    pub services: Vec<ServiceEntry>,
}

impl PipelineConfig {
    /// Pick the service for a language pair
    ///
    /// An exact (source, target) match wins; otherwise the first listed
    /// service is used. `None` only when no services exist.
    pub fn service_for(&self, source_lang: &str, target_lang: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|s| s.source_lang == source_lang && s.target_lang == target_lang)
            .or_else(|| self.services.first())
            .map(|s| s.service_id.as_str())
    }

    /// Auth header to send, if both name and value are set
    pub fn auth_header(&self) -> Option<(&str, &str)> {
        if self.auth_header_name.is_empty() || self.auth_header_value.is_empty() {
            None
        } else {
            Some((&self.auth_header_name, &self.auth_header_value))
        }
    }
}

/// Client for a remote translation pipeline
#[async_trait]
pub trait PipelineProvider: Send + Sync + Debug {
    /// Fetch the runtime configuration of a pipeline for a language pair
    async fn fetch_config(
        &self,
        pipeline_id: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PipelineConfig, ProviderError>;

    /// Translate a single text using a fetched configuration
    async fn execute(
        &self,
        config: &PipelineConfig,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;
}

/// Strategy for choosing a pipeline identifier to try
#[async_trait]
pub trait PipelineResolver: Send + Sync + Debug {
    /// Return a pipeline identifier that supports translation
    async fn resolve_pipeline(&self) -> Result<String, ProviderError>;
}
