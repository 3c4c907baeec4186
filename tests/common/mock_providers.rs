/*!
 * Mock collaborators for testing
 *
 * - `UnavailableStore`: every read reports the store as unreachable
 * - `WriteFailingStore`: reads miss, writes fail
 * - `StubBhashini`: a local axum server speaking the Bhashini wire protocol,
 *   so the real HTTP client can be exercised without external calls
 */

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anuvad::errors::StoreError;
use anuvad::translation::{CacheLookup, CacheStats, CacheStore};

/// Store whose reads and writes all fail
#[derive(Debug, Default, Clone)]
pub struct UnavailableStore {
    pub put_attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl CacheStore for UnavailableStore {
    async fn get(&self, _source_text: &str, _source_lang: &str, _target_lang: &str) -> CacheLookup {
        CacheLookup::Unavailable("database is locked".to_string())
    }

    async fn put(
        &self,
        _source_text: &str,
        _source_lang: &str,
        _target_lang: &str,
        _translated_text: &str,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("database is locked".to_string()))
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }

    async fn stats(&self) -> Result<CacheStats, StoreError> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
}

/// Store that always misses and refuses writes
#[derive(Debug, Default, Clone)]
pub struct WriteFailingStore {
    pub put_attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl CacheStore for WriteFailingStore {
    async fn get(&self, _source_text: &str, _source_lang: &str, _target_lang: &str) -> CacheLookup {
        CacheLookup::Miss
    }

    async fn put(
        &self,
        _source_text: &str,
        _source_lang: &str,
        _target_lang: &str,
        _translated_text: &str,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn stats(&self) -> Result<CacheStats, StoreError> {
        Ok(CacheStats::default())
    }
}

/// Shared state of the stub provider
#[derive(Debug)]
pub struct StubState {
    pub base_url: String,
    pub translation: String,
    pub failing_pipelines: Vec<String>,
    pub compute_status: StatusCode,
    pub translation_services: bool,
    pub empty_output: bool,
    pub searchable_translation: bool,
    pub config_delay: Duration,
    pub config_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub compute_calls: AtomicUsize,
    pub requested_pipelines: Mutex<Vec<String>>,
    pub last_compute_auth: Mutex<Option<String>>,
    pub last_service_id: Mutex<Option<String>>,
}

/// Handle to a running stub provider
#[derive(Debug, Clone)]
pub struct StubBhashini {
    pub state: Arc<StubState>,
}

/// Builder for the stub provider
#[derive(Debug, Clone)]
pub struct StubBuilder {
    translation: String,
    failing_pipelines: Vec<String>,
    compute_status: StatusCode,
    translation_services: bool,
    empty_output: bool,
    searchable_translation: bool,
    config_delay: Duration,
}

impl StubBuilder {
    pub fn failing_pipeline(mut self, pipeline_id: &str) -> Self {
        self.failing_pipelines.push(pipeline_id.to_string());
        self
    }

    pub fn compute_status(mut self, status: StatusCode) -> Self {
        self.compute_status = status;
        self
    }

    /// Config responses list only non-translation tasks
    pub fn without_translation_services(mut self) -> Self {
        self.translation_services = false;
        self
    }

    /// Compute responses carry an empty `pipelineResponse`
    pub fn empty_output(mut self) -> Self {
        self.empty_output = true;
        self
    }

    /// Search results advertise no translation pipeline
    pub fn without_searchable_translation(mut self) -> Self {
        self.searchable_translation = false;
        self
    }

    /// Delay every config response
    pub fn config_delay(mut self, delay: Duration) -> Self {
        self.config_delay = delay;
        self
    }

    /// Bind an ephemeral port and start serving in the background
    pub async fn spawn(self) -> StubBhashini {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub provider");
        let address = listener.local_addr().expect("Stub has no local address");

        let state = Arc::new(StubState {
            base_url: format!("http://{}", address),
            translation: self.translation,
            failing_pipelines: self.failing_pipelines,
            compute_status: self.compute_status,
            translation_services: self.translation_services,
            empty_output: self.empty_output,
            searchable_translation: self.searchable_translation,
            config_delay: self.config_delay,
            config_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            compute_calls: AtomicUsize::new(0),
            requested_pipelines: Mutex::new(Vec::new()),
            last_compute_auth: Mutex::new(None),
            last_service_id: Mutex::new(None),
        });

        let app = Router::new()
            .route("/ulca/apis/v0/model/getModelsPipeline", post(config_handler))
            .route("/compute", post(compute_handler))
            .with_state(state.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        StubBhashini { state }
    }
}

impl StubBhashini {
    /// Stub returning `translation` for every compute request
    pub fn returning(translation: &str) -> StubBuilder {
        StubBuilder {
            translation: translation.to_string(),
            failing_pipelines: Vec::new(),
            compute_status: StatusCode::OK,
            translation_services: true,
            empty_output: false,
            searchable_translation: true,
            config_delay: Duration::ZERO,
        }
    }

    pub fn base_url(&self) -> String {
        self.state.base_url.clone()
    }

    pub fn config_calls(&self) -> usize {
        self.state.config_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.state.search_calls.load(Ordering::SeqCst)
    }

    pub fn compute_calls(&self) -> usize {
        self.state.compute_calls.load(Ordering::SeqCst)
    }

    pub fn requested_pipelines(&self) -> Vec<String> {
        self.state.requested_pipelines.lock().unwrap().clone()
    }

    pub fn last_compute_auth(&self) -> Option<String> {
        self.state.last_compute_auth.lock().unwrap().clone()
    }

    pub fn last_service_id(&self) -> Option<String> {
        self.state.last_service_id.lock().unwrap().clone()
    }
}

async fn config_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let has_user = headers.get("userID").is_some();
    let has_key = headers.get("ulcaApiKey").is_some();
    if !has_user || !has_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "missing credentials" })),
        );
    }

    if !state.config_delay.is_zero() {
        tokio::time::sleep(state.config_delay).await;
    }

    // Search requests carry a bare task type list
    if body.get("pipelineRequestConfig").is_none() && body.get("taskType").is_some() {
        state.search_calls.fetch_add(1, Ordering::SeqCst);
        let mut pipelines = vec![json!({ "pipelineId": "asr-only", "taskType": ["asr"] })];
        if state.searchable_translation {
            pipelines.push(
                json!({ "pipelineId": "searched-pipeline", "taskType": ["translation", "tts"] }),
            );
        }
        return (StatusCode::OK, Json(json!({ "pipelines": pipelines })));
    }

    state.config_calls.fetch_add(1, Ordering::SeqCst);
    let pipeline_id = body["pipelineRequestConfig"]["pipelineId"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    state.requested_pipelines.lock().unwrap().push(pipeline_id.clone());

    if state.failing_pipelines.contains(&pipeline_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": format!("Invalid pipeline {}", pipeline_id) })),
        );
    }

    if !state.translation_services {
        return (
            StatusCode::OK,
            Json(json!({
                "pipelineInferenceAPIEndPoint": {
                    "callbackUrl": format!("{}/compute", state.base_url)
                },
                "pipelineResponseConfig": [
                    { "taskType": "tts", "config": [
                        { "serviceId": "svc-tts-hi", "language": { "sourceLanguage": "hi" } }
                    ]}
                ]
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "pipelineInferenceAPIEndPoint": {
                "callbackUrl": format!("{}/compute", state.base_url),
                "inferenceApiKey": { "name": "Authorization", "value": "stub-inference-token" }
            },
            "pipelineResponseConfig": [
                { "taskType": "translation", "config": [
                    { "serviceId": "svc-en-hi", "modelId": "m1", "language": { "sourceLanguage": "en", "targetLanguage": "hi" } },
                    { "serviceId": "svc-en-ta", "modelId": "m2", "language": { "sourceLanguage": "en", "targetLanguage": "ta" } }
                ]}
            ]
        })),
    )
}

async fn compute_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.compute_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_compute_auth.lock().unwrap() = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_service_id.lock().unwrap() = body["pipelineTasks"][0]["config"]["serviceId"]
        .as_str()
        .map(str::to_string);

    if state.compute_status != StatusCode::OK {
        return (
            state.compute_status,
            Json(json!({ "detail": "upstream exploded" })),
        );
    }

    if state.empty_output {
        return (StatusCode::OK, Json(json!({ "pipelineResponse": [] })));
    }

    let source = body["inputData"]["input"][0]["source"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    (
        StatusCode::OK,
        Json(json!({
            "pipelineResponse": [
                { "taskType": "translation", "config": null,
                  "output": [ { "source": source, "target": state.translation } ],
                  "audio": null }
            ]
        })),
    )
}
