use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::language_utils;

/// Longest cache lifetime accepted for either snapshot family, one year
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Application configuration module
/// This module handles loading, validating and saving the settings for
/// the record store, the cache layer and the translation provider.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the questions and answers are authored in
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Languages the content is served in, the source language included
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Persistence settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Translation provider settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Persistence configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// SQLite file path; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Cache backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Process-local map
    #[default]
    Memory,
    /// SQLite table, survives restarts
    Sqlite,
}

impl std::fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for CacheBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(anyhow!("Invalid cache backend: {}", s)),
        }
    }
}

/// Cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether reads and writes go through the cache at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Backend storing the snapshots
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Separate SQLite cache file; the main database is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Lifetime of `record:<id>` snapshots in seconds
    #[serde(default = "default_record_ttl_secs")]
    pub record_ttl_secs: u64,

    /// Lifetime of `list:` snapshots in seconds
    #[serde(default = "default_list_ttl_secs")]
    pub list_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackendKind::default(),
            path: None,
            record_ttl_secs: default_record_ttl_secs(),
            list_ttl_secs: default_list_ttl_secs(),
        }
    }
}

/// Pagination configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Page size used when the caller does not ask for one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Larger requested page sizes are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProviderKind {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Offline mock, tags text with the target language
    Mock,
}

impl TranslationProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for TranslationProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for TranslationProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProviderKind,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Per-call timeout in seconds; a timed out call counts as a failed language
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub max_retries: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt template
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProviderKind::default(),
            model: default_ollama_model(),
            endpoint: default_ollama_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_supported_languages() -> Vec<String> {
    vec!["en".to_string(), "hi".to_string(), "bn".to_string()]
}

fn default_record_ttl_secs() -> u64 {
    3600
}

fn default_list_ttl_secs() -> u64 {
    300 // list snapshots churn with every new record
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language}. Reply with the translation only and keep any HTML markup intact.".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            supported_languages: default_supported_languages(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            pagination: PaginationConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, writing the defaults first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            log::info!("Created default configuration at {:?}", path);
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let source = language_utils::validate_language_code(&self.source_language)
            .context("Invalid source language")?;

        if self.supported_languages.is_empty() {
            return Err(anyhow!("At least one supported language is required"));
        }

        let mut source_supported = false;
        for language in &self.supported_languages {
            let normalized = language_utils::validate_language_code(language)
                .context("Invalid supported language")?;
            if normalized == source {
                source_supported = true;
            }
        }
        if !source_supported {
            return Err(anyhow!(
                "Source language '{}' must be listed in supported_languages",
                self.source_language
            ));
        }

        for (name, secs) in [
            ("record_ttl_secs", self.cache.record_ttl_secs),
            ("list_ttl_secs", self.cache.list_ttl_secs),
        ] {
            if secs > MAX_CACHE_TTL_SECS {
                return Err(anyhow!(
                    "cache.{} ({}) exceeds the maximum of {} seconds",
                    name,
                    secs,
                    MAX_CACHE_TTL_SECS
                ));
            }
        }

        if self.pagination.default_page_size == 0 || self.pagination.max_page_size == 0 {
            return Err(anyhow!("Page sizes must be greater than zero"));
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(anyhow!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.pagination.default_page_size,
                self.pagination.max_page_size
            ));
        }

        if self.translation.provider == TranslationProviderKind::Ollama {
            url::Url::parse(&self.translation.endpoint).with_context(|| {
                format!("Invalid translation endpoint: {}", self.translation.endpoint)
            })?;
            if self.translation.model.trim().is_empty() {
                return Err(anyhow!("Translation model is required for Ollama provider"));
            }
        }

        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("Translation timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Target languages, i.e. the supported languages minus the source language
    pub fn target_languages(&self) -> Vec<String> {
        let source = language_utils::normalize_language(&self.source_language);
        let mut targets: Vec<String> = Vec::new();
        for language in &self.supported_languages {
            let normalized = language_utils::normalize_language(language);
            if normalized != source && !targets.contains(&normalized) {
                targets.push(normalized);
            }
        }
        targets
    }

    /// Resolve the database path, falling back to the platform data directory
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => crate::database::DatabaseConnection::default_database_path(),
        }
    }

    /// Separate SQLite cache file, `None` to keep the cache in the main database
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache.path.as_deref()
    }

    /// Lifetimes of record and listing snapshots
    pub fn cache_ttls(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.cache.record_ttl_secs),
            Duration::from_secs(self.cache.list_ttl_secs),
        )
    }
}
