/*!
 * HTTP API tests driving the router in-process
 */

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use anuvad::providers::mock::{MockPipeline, MockResolver};
use anuvad::server::{create_router, AppState};
use anuvad::translation::MemoryCache;
use crate::common;

fn router_with(provider: &MockPipeline) -> Router {
    let service = common::service_with_cache(
        provider,
        &MockResolver::returning("fallback"),
        Arc::new(MemoryCache::new()),
    );
    create_router(Arc::new(AppState::new(service)))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_translate_shouldWrapResultInSuccessEnvelope() {
    let app = router_with(&MockPipeline::fixed("नमस्ते"));

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "Hello", "source_lang": "en", "target_lang": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["source_text"], "Hello");
    assert_eq!(body["data"]["target_lang"], "hi");
    assert_eq!(body["data"]["translated_text"], "नमस्ते");
}

#[tokio::test]
async fn test_translate_withMissingField_shouldReturnBadRequest() {
    let provider = MockPipeline::working();
    let app = router_with(&provider);

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "Hello", "source_lang": "en" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["error"],
        "source_text, source_lang, and target_lang are required"
    );
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_translate_withUnsupportedLanguage_shouldReturnBadRequest() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "Hello", "source_lang": "en", "target_lang": "fr" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "target_lang 'fr' is not supported");
}

#[tokio::test]
async fn test_translate_withWhitespaceText_shouldReturnBadRequestFromService() {
    let provider = MockPipeline::working();
    let app = router_with(&provider);

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "   ", "source_lang": "en", "target_lang": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Source text cannot be empty");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_translate_withMalformedJson_shouldReturnBadRequest() {
    let app = router_with(&MockPipeline::working());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/translation/translate")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_translate_withUpstreamFailure_shouldReturnServerError() {
    let app = router_with(&MockPipeline::failing_execute());

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "Hello", "source_lang": "en", "target_lang": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Failed to translate"));
}

#[tokio::test]
async fn test_translateBatch_shouldReturnParallelArrays() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate/batch",
        Some(json!({ "items": [
            { "source_text": "Hello", "source_lang": "en", "target_lang": "hi" },
            { "source_text": "World", "source_lang": "en", "target_lang": "ta" }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source_texts"], json!(["Hello", "World"]));
    assert_eq!(body["data"]["source_langs"], json!(["en", "en"]));
    assert_eq!(body["data"]["target_langs"], json!(["hi", "ta"]));
    assert_eq!(body["data"]["translated_texts"], json!(["[hi] Hello", "[ta] World"]));
}

#[tokio::test]
async fn test_translateBatch_withInvalidItem_shouldReportItsIndex() {
    let provider = MockPipeline::working();
    let app = router_with(&provider);

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate/batch",
        Some(json!({ "items": [
            { "source_text": "Hello", "source_lang": "en", "target_lang": "hi" },
            { "source_text": "World", "source_lang": "en", "target_lang": "xx" }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "item[1]: target_lang 'xx' is not supported");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_translateBatch_withWhitespaceItem_shouldFailWholeBatch() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate/batch",
        Some(json!({ "items": [
            { "source_text": "Hello", "source_lang": "en", "target_lang": "hi" },
            { "source_text": "  ", "source_lang": "en", "target_lang": "hi" }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "item[1]: Source text cannot be empty");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_translateBatch_withNoItems_shouldReturnBadRequest() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/translation/translate/batch",
        Some(json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "items array is required and cannot be empty");
}

#[tokio::test]
async fn test_languages_shouldListSupportedCodes() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(app, "GET", "/api/v1/translation/languages", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!(["en", "hi", "mr", "ta", "te", "gu", "pa", "or", "ml"])
    );
}

#[tokio::test]
async fn test_cacheEndpoints_shouldCleanAndReportStats() {
    let app = router_with(&MockPipeline::working());

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/v1/translation/translate",
        Some(json!({ "source_text": "Hello", "source_lang": "en", "target_lang": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app.clone(), "POST", "/api/v1/translation/cache/clean", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expired cache entries cleaned");
    assert_eq!(body["removed"], 0);

    let (status, body) = send(app, "GET", "/api/v1/translation/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_entries"], 1);
    assert_eq!(body["data"]["live_entries"], 1);
}

#[tokio::test]
async fn test_health_shouldRespondAtRoot() {
    let app = router_with(&MockPipeline::working());

    let (status, body) = send(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "translation-service" }));
}

#[tokio::test]
async fn test_unknownRoute_shouldReturnNotFound() {
    let app = router_with(&MockPipeline::working());

    let (status, _) = send(app, "GET", "/api/v1/translation/unknown", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
