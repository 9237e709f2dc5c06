//! ovaldict.toml 통합 설정 테스트
//!
//! - ovaldict.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use ovaldict_core::config::{OvalDictConfig, StoreErrorPolicy};
use ovaldict_core::error::{ConfigError, OvalDictError};
use serial_test::serial;

// =============================================================================
// ovaldict.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../ovaldict.toml.example");
    let config = OvalDictConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_dir, "/var/log/ovaldict");
    assert_eq!(config.server.bind_url(), "127.0.0.1:1324");
    assert_eq!(config.store.db_path, "/var/lib/ovaldict/oval-db");
    assert_eq!(config.store.error_policy, StoreErrorPolicy::Swallow);
    assert!(!config.metrics.enabled);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../ovaldict.toml.example");
    let config = OvalDictConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_keeps_defaults_for_missing_sections() {
    let config = OvalDictConfig::parse(
        r#"
[server]
port = 8080
"#,
    )
    .expect("partial config should parse");

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.bind, "127.0.0.1");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.store.error_policy, StoreErrorPolicy::Swallow);
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn load_missing_file_returns_file_not_found() {
    let result = OvalDictConfig::load("/nonexistent/ovaldict.toml").await;
    assert!(matches!(
        result,
        Err(OvalDictError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
#[serial]
async fn load_applies_env_overrides_after_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("ovaldict.toml");
    std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").expect("should write config");

    // SAFETY: serial 테스트에서만 환경변수를 변경
    unsafe { std::env::set_var("OVALDICT_GENERAL_LOG_LEVEL", "warn") };
    let result = OvalDictConfig::load(&path).await;
    unsafe { std::env::remove_var("OVALDICT_GENERAL_LOG_LEVEL") };

    let config = result.expect("config should load");
    assert_eq!(config.general.log_level, "warn");
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_env_value_after_override() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("ovaldict.toml");
    std::fs::write(&path, "").expect("should write config");

    unsafe { std::env::set_var("OVALDICT_GENERAL_LOG_FORMAT", "xml") };
    let result = OvalDictConfig::load(&path).await;
    unsafe { std::env::remove_var("OVALDICT_GENERAL_LOG_FORMAT") };

    assert!(matches!(
        result,
        Err(OvalDictError::Config(ConfigError::InvalidValue { .. }))
    ));
}

// =============================================================================
// 잘못된 형식
// =============================================================================

#[test]
fn malformed_toml_returns_parse_error() {
    let result = OvalDictConfig::parse("[server\nport = ");
    assert!(matches!(
        result,
        Err(OvalDictError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn wrong_type_returns_parse_error() {
    let result = OvalDictConfig::parse("[server]\nport = \"high\"");
    assert!(result.is_err());
}
