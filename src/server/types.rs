//! Request, response and state types of the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;
use crate::translation::{BatchTranslator, TranslatedItem, TranslationItem, TranslationService};

/// Shared state of every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: TranslationService,
    pub batch: BatchTranslator,
}

impl AppState {
    pub fn new(service: TranslationService) -> Self {
        Self {
            batch: BatchTranslator::new(service.clone()),
            service,
        }
    }
}

/// Translation request; missing fields are reported by validation, not parsing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
}

impl From<TranslateRequest> for TranslationItem {
    fn from(request: TranslateRequest) -> Self {
        TranslationItem::new(request.source_text, request.source_lang, request.target_lang)
    }
}

/// Translation response
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub translated_text: String,
}

/// Batch translation request
#[derive(Debug, Default, Deserialize)]
pub struct TranslateBatchRequest {
    #[serde(default)]
    pub items: Vec<TranslateRequest>,
}

/// Batch translation response as parallel arrays
#[derive(Debug, Default, Serialize)]
pub struct TranslateBatchResponse {
    pub source_texts: Vec<String>,
    pub source_langs: Vec<String>,
    pub target_langs: Vec<String>,
    pub translated_texts: Vec<String>,
}

impl From<Vec<TranslatedItem>> for TranslateBatchResponse {
    fn from(items: Vec<TranslatedItem>) -> Self {
        let mut response = Self::default();
        for item in items {
            response.source_texts.push(item.source_text);
            response.source_langs.push(item.source_lang);
            response.target_langs.push(item.target_lang);
            response.translated_texts.push(item.translated_text);
        }
        response
    }
}

/// Success envelope: `{"status":"success","data":...}`
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
        })
    }
}

/// Success envelope carrying only a message
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<u64>,
}

/// Liveness probe body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Error envelope: `{"status":"error","error":"..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(error: TranslationError) -> Self {
        if error.is_client_error() {
            Self::bad_request(error.to_string())
        } else {
            Self::internal(error.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "status": "error",
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}
