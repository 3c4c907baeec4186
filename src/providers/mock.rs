/*!
 * Mock provider implementations for testing.
 *
 * - `MockPipeline::working()` - configures and translates every request
 * - `MockPipeline::failing_config()` - every pipeline fails to configure
 * - `MockPipeline::failing_execute()` - configuration works, translation fails
 * - `MockPipeline::empty_output()` - configuration works, no output comes back
 * - `MockResolver` - returns a fixed pipeline identifier or fails
 *
 * Clones share their call counters so a test can hand one copy to the
 * service and inspect the other.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{PipelineConfig, PipelineProvider, PipelineResolver, ServiceEntry};
use crate::errors::ProviderError;

/// Endpoint reported by mock configurations
pub const MOCK_ENDPOINT: &str = "mock://pipeline/compute";

/// Translation behaviour of a mock pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns `[<target>] <text>`
    Working,
    /// Returns a fixed translation for every text
    Fixed(&'static str),
    /// Fails every execute call with a remote 500
    FailingExecute,
    /// Returns no translation output
    EmptyOutput,
}

/// In-process stand-in for a remote pipeline provider
#[derive(Debug, Clone)]
pub struct MockPipeline {
    behavior: MockBehavior,
    /// Pipeline ids whose configuration fails; `None` means none are singled out
    failing_pipelines: Option<Arc<HashSet<String>>>,
    fail_all_configs: bool,
    config_calls: Arc<AtomicUsize>,
    execute_calls: Arc<AtomicUsize>,
    requested_pipelines: Arc<Mutex<Vec<String>>>,
}

impl MockPipeline {
    /// Create a new mock with the specified behaviour
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            failing_pipelines: None,
            fail_all_configs: false,
            config_calls: Arc::new(AtomicUsize::new(0)),
            execute_calls: Arc::new(AtomicUsize::new(0)),
            requested_pipelines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock that translates every request
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Mock that returns the same translation for everything
    pub fn fixed(translation: &'static str) -> Self {
        Self::new(MockBehavior::Fixed(translation))
    }

    /// Mock whose configuration calls always fail
    pub fn failing_config() -> Self {
        let mut mock = Self::working();
        mock.fail_all_configs = true;
        mock
    }

    /// Mock whose translation calls always fail
    pub fn failing_execute() -> Self {
        Self::new(MockBehavior::FailingExecute)
    }

    /// Mock whose pipeline answers without any translation output
    pub fn empty_output() -> Self {
        Self::new(MockBehavior::EmptyOutput)
    }

    /// Make configuration fail for the given pipeline ids only
    pub fn with_failing_pipelines<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing_pipelines = Some(Arc::new(ids.into_iter().map(Into::into).collect()));
        self
    }

    /// Number of `fetch_config` calls so far
    pub fn config_calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls so far
    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    /// Total remote calls of either kind
    pub fn total_calls(&self) -> usize {
        self.config_calls() + self.execute_calls()
    }

    /// Pipeline ids passed to `fetch_config`, in call order
    pub fn requested_pipelines(&self) -> Vec<String> {
        self.requested_pipelines.lock().clone()
    }

    fn config_fails_for(&self, pipeline_id: &str) -> bool {
        self.fail_all_configs
            || self
                .failing_pipelines
                .as_ref()
                .is_some_and(|ids| ids.contains(pipeline_id))
    }
}

#[async_trait]
impl PipelineProvider for MockPipeline {
    async fn fetch_config(
        &self,
        pipeline_id: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PipelineConfig, ProviderError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pipelines.lock().push(pipeline_id.to_string());

        if self.config_fails_for(pipeline_id) {
            return Err(ProviderError::Config(format!(
                "API returned status 404: pipeline {} not found",
                pipeline_id
            )));
        }

        Ok(PipelineConfig {
            endpoint_url: MOCK_ENDPOINT.to_string(),
            auth_header_name: "Authorization".to_string(),
            auth_header_value: "mock-token".to_string(),
            services: vec![ServiceEntry::new(
                source_lang,
                target_lang,
                format!("mock-{}-{}", source_lang, target_lang),
            )],
        })
    }

    async fn execute(
        &self,
        config: &PipelineConfig,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);

        if config.endpoint_url.is_empty() {
            return Err(ProviderError::EmptyCallback);
        }
        if config.service_for(source_lang, target_lang).is_none() {
            return Err(ProviderError::NoService {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(format!("[{}] {}", target_lang, source_text)),
            MockBehavior::Fixed(text) => Ok(text.to_string()),
            MockBehavior::FailingExecute => Err(ProviderError::Remote {
                status: 500,
                body: "Simulated provider failure".to_string(),
                payload: source_text.to_string(),
            }),
            MockBehavior::EmptyOutput => Err(ProviderError::NoOutput),
        }
    }
}

/// Resolver returning a fixed id, or failing when none is set
#[derive(Debug, Clone)]
pub struct MockResolver {
    pipeline_id: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockResolver {
    /// Resolver that always returns `pipeline_id`
    pub fn returning(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: Some(pipeline_id.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver that always fails
    pub fn failing() -> Self {
        Self {
            pipeline_id: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of resolve calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineResolver for MockResolver {
    async fn resolve_pipeline(&self) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pipeline_id
            .clone()
            .ok_or_else(|| ProviderError::Transport("Simulated search failure".to_string()))
    }
}
