/*!
 * Integration tests for the Bhashini client against a local stub provider
 */

use anyhow::Result;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use anuvad::errors::{ProviderError, TranslationError};
use anuvad::providers::{
    Bhashini, PipelineProvider, PipelineResolver, SearchPipelineResolver, StaticPipelineResolver,
};
use anuvad::translation::{MemoryCache, TranslationService};
use crate::common::mock_providers::StubBhashini;
use crate::common::{self, TEST_API_KEY, TEST_USER_ID};

fn client_for(stub: &StubBhashini) -> Bhashini {
    Bhashini::with_timeout(stub.base_url(), TEST_USER_ID, TEST_API_KEY, Duration::from_secs(5))
        .expect("Failed to build client")
}

#[tokio::test]
async fn test_fetchConfig_shouldFlattenTranslationServices() -> Result<()> {
    let stub = StubBhashini::returning("नमस्ते").spawn().await;
    let client = client_for(&stub);

    let config = client.fetch_config("pipeline-1", "en", "hi").await?;

    assert_eq!(config.endpoint_url, format!("{}/compute", stub.base_url()));
    assert_eq!(config.auth_header(), Some(("Authorization", "stub-inference-token")));
    assert_eq!(config.services.len(), 2);
    assert_eq!(stub.requested_pipelines(), vec!["pipeline-1"]);
    Ok(())
}

#[tokio::test]
async fn test_execute_shouldSendAuthHeaderAndMatchingService() -> Result<()> {
    let stub = StubBhashini::returning("வணக்கம்").spawn().await;
    let client = client_for(&stub);

    let config = client.fetch_config("pipeline-1", "en", "ta").await?;
    let translated = client.execute(&config, "Hello", "en", "ta").await?;

    assert_eq!(translated, "வணக்கம்");
    assert_eq!(stub.last_compute_auth().as_deref(), Some("stub-inference-token"));
    assert_eq!(stub.last_service_id().as_deref(), Some("svc-en-ta"));
    Ok(())
}

#[tokio::test]
async fn test_fetchConfig_withRejectedPipeline_shouldAddApiKeyHint() {
    let stub = StubBhashini::returning("x")
        .failing_pipeline("bad-pipeline")
        .spawn()
        .await;
    let client = client_for(&stub);

    let err = client.fetch_config("bad-pipeline", "en", "hi").await.unwrap_err();

    match err {
        ProviderError::Config(message) => {
            assert!(message.contains("API returned status 400"));
            assert!(message.contains("Invalid pipeline bad-pipeline"));
            assert!(message.contains("ulcaApiKey"));
        }
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_withUpstreamFailure_shouldReturnRemoteErrorWithPayload() -> Result<()> {
    let stub = StubBhashini::returning("x")
        .compute_status(StatusCode::SERVICE_UNAVAILABLE)
        .spawn()
        .await;
    let client = client_for(&stub);
    let config = client.fetch_config("pipeline-1", "en", "hi").await?;

    let err = client.execute(&config, "Hello", "en", "hi").await.unwrap_err();

    match err {
        ProviderError::Remote { status, body, payload } => {
            assert_eq!(status, 503);
            assert!(body.contains("upstream exploded"));
            assert!(payload.contains(r#""source":"Hello""#));
            assert!(payload.contains(r#""serviceId":"svc-en-hi""#));
        }
        other => panic!("expected Remote error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_searchResolver_shouldPickPipelineAdvertisingTranslation() -> Result<()> {
    let stub = StubBhashini::returning("x").spawn().await;
    let resolver = SearchPipelineResolver::new(Arc::new(client_for(&stub)));

    let pipeline_id = resolver.resolve_pipeline().await?;

    assert_eq!(pipeline_id, "searched-pipeline");
    assert_eq!(stub.search_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_translationService_withStaleActivePipeline_shouldRecoverThroughFallback() -> Result<()> {
    common::init_test_logging();
    let stub = StubBhashini::returning("नमस्ते")
        .failing_pipeline("retired-pipeline")
        .spawn()
        .await;
    let service = TranslationService::new(
        Arc::new(client_for(&stub)),
        Arc::new(StaticPipelineResolver::new(vec!["live-pipeline".to_string()])),
        Arc::new(MemoryCache::new()),
        "retired-pipeline",
        Duration::from_secs(60),
    );

    let first = service.translate("Hello", "en", "hi").await?;
    let second = service.translate("Hello", "en", "hi").await?;

    assert_eq!(first, "नमस्ते");
    assert_eq!(second, "नमस्ते");
    assert_eq!(stub.requested_pipelines(), vec!["retired-pipeline", "live-pipeline"]);
    assert_eq!(stub.compute_calls(), 1);
    assert_eq!(service.active_pipeline_id(), "live-pipeline");
    Ok(())
}

#[tokio::test]
async fn test_translationService_withUnreachableProvider_shouldReportPipelineUnavailable() {
    let client = Bhashini::with_timeout(
        "http://127.0.0.1:9",
        TEST_USER_ID,
        TEST_API_KEY,
        Duration::from_millis(500),
    )
    .expect("Failed to build client");
    let service = TranslationService::new(
        Arc::new(client),
        Arc::new(StaticPipelineResolver::default()),
        Arc::new(MemoryCache::new()),
        "any-pipeline",
        Duration::from_secs(60),
    );

    let err = service.translate("Hello", "en", "hi").await.unwrap_err();

    assert!(matches!(
        err,
        TranslationError::PipelineUnavailable(ProviderError::Transport(_))
    ));
}

#[tokio::test]
async fn test_fetchConfig_withoutTranslationTasks_shouldReturnNoService() {
    let stub = StubBhashini::returning("x")
        .without_translation_services()
        .spawn()
        .await;
    let client = client_for(&stub);

    let err = client.fetch_config("pipeline-1", "en", "hi").await.unwrap_err();

    match err {
        ProviderError::NoService { source_lang, target_lang } => {
            assert_eq!(source_lang, "en");
            assert_eq!(target_lang, "hi");
        }
        other => panic!("expected NoService error, got {:?}", other),
    }
    assert_eq!(stub.config_calls(), 1);
}

#[tokio::test]
async fn test_execute_withEmptyPipelineResponse_shouldReturnNoOutput() -> Result<()> {
    let stub = StubBhashini::returning("x").empty_output().spawn().await;
    let client = client_for(&stub);
    let config = client.fetch_config("pipeline-1", "en", "hi").await?;

    let err = client.execute(&config, "Hello", "en", "hi").await.unwrap_err();

    assert!(matches!(err, ProviderError::NoOutput));
    assert_eq!(stub.compute_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_searchResolver_withoutTranslationPipeline_shouldFailWithConfig() {
    let stub = StubBhashini::returning("x")
        .without_searchable_translation()
        .spawn()
        .await;
    let resolver = SearchPipelineResolver::new(Arc::new(client_for(&stub)));

    let err = resolver.resolve_pipeline().await.unwrap_err();

    assert!(matches!(err, ProviderError::Config(_)));
    assert_eq!(stub.search_calls(), 1);
}

#[tokio::test]
async fn test_withTimeout_withSlowProvider_shouldGiveUpAtConfiguredBound() {
    let stub = StubBhashini::returning("x")
        .config_delay(Duration::from_secs(5))
        .spawn()
        .await;
    let client = Bhashini::with_timeout(
        stub.base_url(),
        TEST_USER_ID,
        TEST_API_KEY,
        Duration::from_millis(200),
    )
    .expect("Failed to build client");

    let started = std::time::Instant::now();
    let err = client.fetch_config("pipeline-1", "en", "hi").await.unwrap_err();

    assert!(matches!(err, ProviderError::Transport(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
}
