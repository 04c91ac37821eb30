/*!
 * Tests for application configuration
 */

use polyfaq::app_config::{CacheBackendKind, Config, LogLevel, TranslationProviderKind};
use std::str::FromStr;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_config_default_shouldUseDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.supported_languages, vec!["en", "hi", "bn"]);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.backend, CacheBackendKind::Memory);
    assert_eq!(config.cache.record_ttl_secs, 3600);
    assert_eq!(config.cache.list_ttl_secs, 300);
    assert_eq!(config.pagination.default_page_size, 10);
    assert_eq!(config.pagination.max_page_size, 100);
    assert_eq!(config.translation.provider, TranslationProviderKind::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_targetLanguages_shouldNormalizeAndDeduplicate() {
    let config = Config {
        supported_languages: vec![
            "EN".to_string(),
            " hi ".to_string(),
            "HI".to_string(),
            "pt_BR".to_string(),
        ],
        ..Config::default()
    };

    assert_eq!(config.target_languages(), vec!["hi", "pt-br"]);
}

#[test]
fn test_config_validate_withUnknownLanguage_shouldFail() {
    let config = Config {
        supported_languages: vec!["en".to_string(), "qq".to_string()],
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withBadEndpoint_shouldOnlyMatterForOllama() {
    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert_err!(config.validate());

    config.translation.provider = TranslationProviderKind::Mock;
    assert_ok!(config.validate());
}

#[test]
fn test_config_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    config.translation.timeout_secs = 0;

    assert_err!(config.validate());
}

#[test]
fn test_config_saveThenLoad_shouldKeepValues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.cache.backend = CacheBackendKind::Sqlite;
    config.cache.list_ttl_secs = 42;
    config.log_level = LogLevel::Debug;

    config.save(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded.cache.backend, CacheBackendKind::Sqlite);
    assert_eq!(loaded.cache.list_ttl_secs, 42);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_enums_fromStr_shouldAcceptAnyCase() {
    assert_eq!(CacheBackendKind::from_str("SQLite").unwrap(), CacheBackendKind::Sqlite);
    assert_eq!(
        TranslationProviderKind::from_str("Mock").unwrap(),
        TranslationProviderKind::Mock
    );
    assert!(CacheBackendKind::from_str("redis").is_err());
}
