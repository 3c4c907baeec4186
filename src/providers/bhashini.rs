/*!
 * Client for the Bhashini (ULCA) pipeline API.
 *
 * Two endpoints are involved:
 * - the configuration endpoint on the fixed base URL, authenticated with the
 *   `userID` and `ulcaApiKey` headers, which describes a pipeline
 * - the per-pipeline inference endpoint, whose URL and auth header come from
 *   the configuration response
 *
 * Every call is bounded by the client timeout and is never retried here.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{PipelineConfig, PipelineProvider, ServiceEntry, TRANSLATION_TASK};
use crate::errors::ProviderError;

/// Public ULCA auth host
pub const DEFAULT_BASE_URL: &str = "https://meity-auth.ulcacontrib.org";

/// Pipeline config and search both post to this path
const PIPELINE_CONFIG_PATH: &str = "/ulca/apis/v0/model/getModelsPipeline";

/// Upper bound for every outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// ULCA API keys are well above this length; anything shorter is a copy/paste mistake
const MIN_API_KEY_LEN: usize = 20;

/// Request body for the pipeline config API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfigRequest {
    pipeline_tasks: Vec<PipelineTask>,
    pipeline_request_config: PipelineRequestConfig,
}

/// A task requested from a pipeline
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    task_type: String,
}

/// Pipeline selector
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequestConfig {
    pipeline_id: String,
}

impl PipelineConfigRequest {
    /// Config request for the translation task of a pipeline
    pub fn translation(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_tasks: vec![PipelineTask {
                task_type: TRANSLATION_TASK.to_string(),
            }],
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: pipeline_id.into(),
            },
        }
    }
}

/// Response of the pipeline config API
#[derive(Debug, Default, Deserialize)]
pub struct PipelineConfigResponse {
    /// Inference endpoint and its credentials
    #[serde(rename = "pipelineInferenceAPIEndPoint", default)]
    pub inference_endpoint: InferenceEndpoint,
    /// Per-task service listings
    #[serde(rename = "pipelineResponseConfig", default)]
    pub response_config: Vec<TaskConfig>,
}

/// Inference endpoint description
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceEndpoint {
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub inference_api_key: Option<InferenceApiKey>,
}

/// Header name/value pair the inference endpoint expects
#[derive(Debug, Default, Deserialize)]
pub struct InferenceApiKey {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Services offered for one task type
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub task_type: String,
    #[serde(default)]
    pub config: Vec<ServiceConfig>,
}

/// One service and the language pair it handles
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub service_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    pub language: LanguagePair,
}

/// Language pair of a service (the API returns a flat structure)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePair {
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub source_script_code: Option<String>,
    #[serde(default)]
    pub target_language: String,
    #[serde(default)]
    pub target_script_code: Option<String>,
}

impl PipelineConfigResponse {
    /// Flatten into the provider-independent config, keeping only translation services
    pub fn into_pipeline_config(self) -> PipelineConfig {
        let (auth_header_name, auth_header_value) = match self.inference_endpoint.inference_api_key {
            Some(key) => (key.name.unwrap_or_default(), key.value.unwrap_or_default()),
            None => (String::new(), String::new()),
        };

        let services = self
            .response_config
            .into_iter()
            .filter(|task| task.task_type == TRANSLATION_TASK)
            .flat_map(|task| task.config)
            .map(|service| {
                ServiceEntry::new(
                    service.language.source_language,
                    service.language.target_language,
                    service.service_id,
                )
            })
            .collect();

        PipelineConfig {
            endpoint_url: self.inference_endpoint.callback_url.unwrap_or_default(),
            auth_header_name,
            auth_header_value,
            services,
        }
    }
}

/// Request body for the inference endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineComputeRequest {
    pipeline_tasks: Vec<ComputeTask>,
    input_data: InputData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeTask {
    task_type: String,
    config: ComputeTaskConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeTaskConfig {
    language: TaskLanguage,
    service_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskLanguage {
    source_language: String,
    target_language: String,
}

#[derive(Debug, Serialize)]
struct InputData {
    input: Vec<InputItem>,
}

#[derive(Debug, Serialize)]
struct InputItem {
    source: String,
}

impl PipelineComputeRequest {
    /// Single-item translation batch
    pub fn translation(
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
        service_id: &str,
    ) -> Self {
        Self {
            pipeline_tasks: vec![ComputeTask {
                task_type: TRANSLATION_TASK.to_string(),
                config: ComputeTaskConfig {
                    language: TaskLanguage {
                        source_language: source_lang.to_string(),
                        target_language: target_lang.to_string(),
                    },
                    service_id: service_id.to_string(),
                },
            }],
            input_data: InputData {
                input: vec![InputItem {
                    source: source_text.to_string(),
                }],
            },
        }
    }
}

/// Response of the inference endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineComputeResponse {
    #[serde(default)]
    pub pipeline_response: Vec<PipelineResponseItem>,
}

/// Output of one pipeline task
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponseItem {
    pub task_type: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// Source/target pair produced by a task
#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

impl PipelineComputeResponse {
    /// Target text of the first translation task that produced output
    pub fn translated_text(&self) -> Option<&str> {
        self.pipeline_response
            .iter()
            .find(|item| item.task_type == TRANSLATION_TASK && !item.output.is_empty())
            .map(|item| item.output[0].target.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// Request body for the pipeline search API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineSearchRequest {
    task_type: Vec<String>,
}

/// Response of the pipeline search API
#[derive(Debug, Default, Deserialize)]
pub struct PipelineSearchResponse {
    #[serde(default)]
    pub pipelines: Vec<PipelineInfo>,
}

/// A pipeline advertised by the search API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInfo {
    pub pipeline_id: String,
    #[serde(default)]
    pub task_type: Vec<String>,
}

impl PipelineInfo {
    /// Whether the pipeline advertises the translation task
    pub fn supports_translation(&self) -> bool {
        self.task_type.iter().any(|t| t == TRANSLATION_TASK)
    }
}

/// Bhashini client for interacting with the ULCA pipeline API
pub struct Bhashini {
    /// Base URL of the auth/config host
    base_url: String,
    /// ULCA user id
    user_id: String,
    /// ULCA API key
    api_key: String,
    /// HTTP client for making requests
    client: Client,
}

impl std::fmt::Debug for Bhashini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bhashini")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("api_key", &mask_secret(&self.api_key))
            .finish()
    }
}

impl Bhashini {
    /// Create a new client with the default 30 second timeout
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, user_id, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            user_id: user_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            client,
        })
    }

    /// Base URL of the configuration host
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn config_url(&self) -> String {
        format!("{}{}", self.base_url, PIPELINE_CONFIG_PATH)
    }

    /// Reject missing or obviously malformed credentials before any network call
    fn check_credentials(&self) -> Result<(), ProviderError> {
        if self.user_id.is_empty() {
            return Err(ProviderError::Config(
                "BHASHINI_USER_ID is not set or empty".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(ProviderError::Config(
                "BHASHINI_API_KEY is not set or empty. Get your API key from https://bhashini.gov.in/ulca/dashboard".to_string(),
            ));
        }
        if self.api_key.len() < MIN_API_KEY_LEN {
            return Err(ProviderError::Config(format!(
                "API key seems too short ({} chars) - verify you're using the ulcaApiKey from the dashboard",
                self.api_key.len()
            )));
        }
        Ok(())
    }

    /// Post a JSON body to the configuration endpoint with ULCA credentials
    async fn post_to_config_endpoint<T: Serialize + ?Sized>(
        &self,
        body: &T,
    ) -> Result<(StatusCode, String), ProviderError> {
        let response = self
            .client
            .post(self.config_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header("userID", &self.user_id)
            .header("ulcaApiKey", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        Ok((status, text))
    }

    /// List the pipelines that advertise the translation task
    pub async fn search_pipelines(&self) -> Result<Vec<PipelineInfo>, ProviderError> {
        if self.user_id.is_empty() || self.api_key.is_empty() {
            return Err(ProviderError::Config(
                "BHASHINI_USER_ID and BHASHINI_API_KEY must be set".to_string(),
            ));
        }

        let request = PipelineSearchRequest {
            task_type: vec![TRANSLATION_TASK.to_string()],
        };
        let (status, body) = self.post_to_config_endpoint(&request).await?;

        if !status.is_success() {
            error!("Pipeline search failed ({}): {}", status, body);
            return Err(ProviderError::Config(format!(
                "API returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let response: PipelineSearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        debug!("Pipeline search returned {} pipeline(s)", response.pipelines.len());
        Ok(response.pipelines)
    }
}

#[async_trait]
impl PipelineProvider for Bhashini {
    async fn fetch_config(
        &self,
        pipeline_id: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PipelineConfig, ProviderError> {
        self.check_credentials()?;

        debug!(
            "Fetching config of pipeline '{}' for {} -> {}",
            pipeline_id, source_lang, target_lang
        );

        let request = PipelineConfigRequest::translation(pipeline_id);
        let (status, body) = self.post_to_config_endpoint(&request).await?;

        if !status.is_success() {
            error!("Pipeline config request failed ({}): {}", status, body);
            let hint = if status == StatusCode::BAD_REQUEST {
                ". Verify the key is the 'ulcaApiKey' from the 'My Profile' section, that it is active, and that it has no extra spaces or quotes"
            } else {
                ""
            };
            return Err(ProviderError::Config(format!(
                "API returned status {}: {}{}",
                status.as_u16(),
                body,
                hint
            )));
        }

        let response: PipelineConfigResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let config = response.into_pipeline_config();

        if config.services.is_empty() {
            return Err(ProviderError::NoService {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            });
        }

        Ok(config)
    }

    async fn execute(
        &self,
        config: &PipelineConfig,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        if config.endpoint_url.is_empty() {
            return Err(ProviderError::EmptyCallback);
        }

        let service_id = config
            .service_for(source_lang, target_lang)
            .ok_or_else(|| ProviderError::NoService {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            })?;

        let request =
            PipelineComputeRequest::translation(source_text, source_lang, target_lang, service_id);
        let payload =
            serde_json::to_string(&request).map_err(|e| ProviderError::Parse(e.to_string()))?;

        debug!(
            "Executing translation via service '{}' ({} -> {})",
            service_id, source_lang, target_lang
        );

        let mut builder = self
            .client
            .post(&config.endpoint_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload.clone());

        if let Some((name, value)) = config.auth_header() {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            error!("Translation request failed ({}): {}", status, body);
            return Err(ProviderError::Remote {
                status: status.as_u16(),
                body,
                payload,
            });
        }

        let response: PipelineComputeResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        response
            .translated_text()
            .map(str::to_string)
            .ok_or(ProviderError::NoOutput)
    }
}

/// Classify a reqwest failure
fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::Config(format!("Invalid request: {}", e))
    } else if e.is_timeout() {
        ProviderError::Transport(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        ProviderError::Transport(format!("Connection failed: {}", e))
    } else {
        ProviderError::Transport(format!("Failed to execute request: {}", e))
    }
}

/// Show only the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        "*".repeat(chars.len())
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}
