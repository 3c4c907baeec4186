/*!
 * Tests for configuration loading and precedence
 */

use anyhow::Result;
use std::time::Duration;

use anuvad::app_config::{CacheBackend, Config, ConfigOverrides, LogLevel, PipelineDiscovery};
use crate::common;

#[test]
fn test_serializedDefault_shouldUseSnakeCaseSections() -> Result<()> {
    let value = serde_json::to_value(Config::default())?;

    assert_eq!(value["pipeline_id"], "64392f96daac500b55c543cd");
    assert_eq!(value["provider"]["discovery"], "static");
    assert_eq!(value["cache"]["backend"], "sqlite");
    assert_eq!(value["cache"]["ttl_secs"], 86_400);
    assert_eq!(value["server"]["port"], 3001);
    assert_eq!(value["log_level"], "info");
    Ok(())
}

#[test]
fn test_overrides_shouldTakePrecedenceOverFile() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("anuvad.json");
    std::fs::write(
        &path,
        r#"{
            "pipeline_id": "from-file",
            "provider": { "user_id": "file-user", "api_key": "file-key-0123456789abcdef" },
            "cache": { "ttl_secs": 60 },
            "server": { "port": 4000 }
        }"#,
    )?;

    let mut config = Config::load_or_create(&path)?;
    assert_eq!(config.pipeline_id, "from-file");
    assert_eq!(config.server.port, 4000);

    config.apply_overrides(&ConfigOverrides {
        pipeline_id: Some("from-env".to_string()),
        cache_ttl: Some("2d".to_string()),
        ..Default::default()
    })?;

    assert_eq!(config.pipeline_id, "from-env");
    assert_eq!(config.cache_ttl(), Duration::from_secs(2 * 24 * 60 * 60));
    // Untouched values keep the file's settings
    assert_eq!(config.provider.user_id, "file-user");
    assert_eq!(config.server.port, 4000);
    Ok(())
}

#[test]
fn test_overrides_shouldSwitchBackendAndDiscovery() -> Result<()> {
    let mut config = Config::default();

    config.apply_overrides(&ConfigOverrides {
        cache_backend: Some(CacheBackend::Memory),
        discovery: Some(PipelineDiscovery::Search),
        log_level: Some(LogLevel::Warn),
        ..Default::default()
    })?;

    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.provider.discovery, PipelineDiscovery::Search);
    assert_eq!(config.log_level, LogLevel::Warn);
    Ok(())
}

#[test]
fn test_hasCredentials_withBlankKey_shouldBeFalse() {
    let mut config = Config::default();
    config.provider.user_id = "user".to_string();
    config.provider.api_key = "   ".to_string();

    assert!(!config.provider.has_credentials());
}
