//! HTTP handlers of the translation API

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use log::{debug, error};
use std::sync::Arc;

use super::types::{
    ApiError, ApiMessage, ApiSuccess, AppState, HealthResponse, TranslateBatchRequest,
    TranslateBatchResponse, TranslateRequest, TranslateResponse,
};
use crate::language_utils::{is_supported_language, SUPPORTED_LANGUAGES};
use crate::translation::{CacheStats, TranslationItem};

/// Check required fields and language codes of one request
fn validate_request(request: &TranslateRequest) -> Result<(), String> {
    if request.source_text.is_empty()
        || request.source_lang.is_empty()
        || request.target_lang.is_empty()
    {
        return Err("source_text, source_lang, and target_lang are required".to_string());
    }
    if !is_supported_language(&request.source_lang) {
        return Err(format!("source_lang '{}' is not supported", request.source_lang));
    }
    if !is_supported_language(&request.target_lang) {
        return Err(format!("target_lang '{}' is not supported", request.target_lang));
    }
    Ok(())
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}

/// POST /api/v1/translation/translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess<TranslateResponse>>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    validate_request(&request).map_err(ApiError::bad_request)?;

    let translated_text = state
        .service
        .translate(&request.source_text, &request.source_lang, &request.target_lang)
        .await?;

    Ok(ApiSuccess::new(TranslateResponse {
        source_text: request.source_text,
        source_lang: request.source_lang,
        target_lang: request.target_lang,
        translated_text,
    }))
}

/// POST /api/v1/translation/translate/batch
pub async fn translate_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateBatchRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess<TranslateBatchResponse>>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    if request.items.is_empty() {
        return Err(ApiError::bad_request(
            "items array is required and cannot be empty",
        ));
    }

    for (index, item) in request.items.iter().enumerate() {
        validate_request(item)
            .map_err(|message| ApiError::bad_request(format!("item[{}]: {}", index, message)))?;
    }

    debug!("Batch request with {} items", request.items.len());

    let items: Vec<TranslationItem> = request.items.into_iter().map(Into::into).collect();
    let translated = state.batch.translate_batch(&items).await?;

    Ok(ApiSuccess::new(TranslateBatchResponse::from(translated)))
}

/// GET /api/v1/translation/languages
pub async fn languages() -> Json<ApiSuccess<&'static [&'static str]>> {
    ApiSuccess::new(SUPPORTED_LANGUAGES)
}

/// POST /api/v1/translation/cache/clean
pub async fn clean_cache(State(state): State<Arc<AppState>>) -> Result<Json<ApiMessage>, ApiError> {
    let removed = state.service.clean_expired_cache().await.map_err(|e| {
        error!("Cache cleanup failed: {}", e);
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(ApiMessage {
        status: "success",
        message: "Expired cache entries cleaned".to_string(),
        removed: Some(removed),
    }))
}

/// GET /api/v1/translation/cache/stats
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiSuccess<CacheStats>>, ApiError> {
    let stats = state
        .service
        .cache_stats()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ApiSuccess::new(stats))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "translation-service",
    })
}
