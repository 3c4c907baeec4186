/*!
 * Pipeline resolution strategies.
 *
 * The orchestrator asks a resolver for a replacement pipeline identifier when
 * the active one can no longer be configured. Two strategies exist:
 * - `StaticPipelineResolver`: first entry of a fixed list of known pipelines
 * - `SearchPipelineResolver`: asks the provider's search API
 */

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use super::{Bhashini, PipelineResolver};
use crate::errors::ProviderError;

/// Pipelines known to support translation at the time of writing
pub const KNOWN_PIPELINES: &[&str] = &[
    "64392f96daac500b55c543cd",
    "660f813c0413087224435d2c",
    "660f866443e53d4133f65317",
];

/// Returns the first entry of a fixed list of pipeline identifiers
#[derive(Debug, Clone)]
pub struct StaticPipelineResolver {
    known: Vec<String>,
}

impl StaticPipelineResolver {
    /// Resolver over a custom list, in preference order
    pub fn new(known: Vec<String>) -> Self {
        Self { known }
    }

    /// Identifiers this resolver chooses from
    pub fn known(&self) -> &[String] {
        &self.known
    }
}

impl Default for StaticPipelineResolver {
    fn default() -> Self {
        Self::new(KNOWN_PIPELINES.iter().map(|id| id.to_string()).collect())
    }
}

#[async_trait]
impl PipelineResolver for StaticPipelineResolver {
    async fn resolve_pipeline(&self) -> Result<String, ProviderError> {
        let pipeline_id = self.known.first().cloned().ok_or_else(|| {
            ProviderError::Config("No known translation pipelines configured".to_string())
        })?;

        debug!("Resolved pipeline '{}' from the known list", pipeline_id);
        Ok(pipeline_id)
    }
}

/// Asks the Bhashini search API for a pipeline that supports translation
#[derive(Debug, Clone)]
pub struct SearchPipelineResolver {
    client: Arc<Bhashini>,
}

impl SearchPipelineResolver {
    pub fn new(client: Arc<Bhashini>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineResolver for SearchPipelineResolver {
    async fn resolve_pipeline(&self) -> Result<String, ProviderError> {
        let pipelines = self.client.search_pipelines().await?;

        let found = pipelines
            .iter()
            .find(|p| p.supports_translation())
            .map(|p| p.pipeline_id.clone())
            .ok_or_else(|| {
                ProviderError::Config("No translation pipeline found".to_string())
            })?;

        info!("Pipeline search selected '{}'", found);
        Ok(found)
    }
}
