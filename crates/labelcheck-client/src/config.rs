//! Client configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file named by `LABELCHECK_CONFIG`
//! - environment variables (`LABELCHECK_*` prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use labelcheck_client::config::Config;
//!
//! // File named by LABELCHECK_CONFIG, or environment variables
//! let config = Config::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = Config::from_file(std::path::Path::new("labelcheck.toml")).expect("Failed to load");
//! ```
//!
//! # File format
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:8000"
//! verify_endpoint = "hybrid"   # or "single"
//! top_k = 5                    # optional
//! request_timeout_secs = 300
//! verify_timeout_secs = 60
//!
//! [collection]
//! mode = "keyword"             # or "fixed"
//! fixed = "label_poc_2"        # required when mode = "fixed"
//! end_page = 1
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use labelcheck_core::defaults;
use labelcheck_core::{CollectionBinding, CollectionResolver, CollectionStrategy};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid verify endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid collection mode: {0}")]
    InvalidMode(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for labelcheck_core::Error {
    fn from(e: ConfigError) -> Self {
        labelcheck_core::Error::Config(e.to_string())
    }
}

// =============================================================================
// API
// =============================================================================

/// Which claim verification endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerifyEndpoint {
    /// Hybrid (keyword + dense) retrieval.
    #[default]
    Hybrid,
    /// Dense retrieval only.
    Single,
}

impl VerifyEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Hybrid => defaults::PATH_VERIFY_HYBRID,
            Self::Single => defaults::PATH_VERIFY_SINGLE,
        }
    }
}

impl FromStr for VerifyEndpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "single" => Ok(Self::Single),
            _ => Err(ConfigError::InvalidEndpoint(s.to_string())),
        }
    }
}

impl fmt::Display for VerifyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hybrid => write!(f, "hybrid"),
            Self::Single => write!(f, "single"),
        }
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub verify_endpoint: VerifyEndpoint,
    /// Retrieval depth sent with verification requests; omitted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "ApiConfig::default_verify_timeout")]
    pub verify_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            verify_endpoint: VerifyEndpoint::default(),
            top_k: None,
            request_timeout_secs: Self::default_request_timeout(),
            verify_timeout_secs: Self::default_verify_timeout(),
        }
    }
}

impl ApiConfig {
    fn default_base_url() -> String {
        defaults::API_BASE_URL.to_string()
    }

    fn default_request_timeout() -> u64 {
        defaults::REQUEST_TIMEOUT_SECS
    }

    fn default_verify_timeout() -> u64 {
        defaults::VERIFY_TIMEOUT_SECS
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "api base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.request_timeout_secs == 0 || self.verify_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be at least one second".to_string(),
            ));
        }

        if self.top_k == Some(0) {
            return Err(ConfigError::Validation(
                "top_k must be positive when set".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// How the session collection is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Resolve from the first primary document's filename.
    #[default]
    Keyword,
    /// Use the configured collection id.
    Fixed,
}

impl FromStr for CollectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "fixed" => Ok(Self::Fixed),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Collection selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub mode: CollectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    #[serde(default = "CollectionConfig::default_end_page")]
    pub end_page: u32,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            mode: CollectionMode::default(),
            fixed: None,
            end_page: Self::default_end_page(),
        }
    }
}

impl CollectionConfig {
    fn default_end_page() -> u32 {
        defaults::DEFAULT_END_PAGE
    }

    /// Switch to fixed mode with the given collection id.
    pub fn select(&mut self, collection_id: impl Into<String>) {
        self.mode = CollectionMode::Fixed;
        self.fixed = Some(collection_id.into());
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.end_page == 0 {
            return Err(ConfigError::Validation(
                "collection end_page must be at least 1".to_string(),
            ));
        }

        if self.mode == CollectionMode::Fixed
            && self.fixed.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "collection mode 'fixed' requires a collection id".to_string(),
            ));
        }

        Ok(())
    }

    /// Strategy used by the ingestion workflow.
    pub fn strategy(&self) -> CollectionStrategy {
        match (self.mode, self.fixed.as_deref()) {
            (CollectionMode::Fixed, Some(id)) => {
                CollectionStrategy::Fixed(CollectionBinding::new(id.trim(), self.end_page))
            }
            _ => CollectionStrategy::Keyword(CollectionResolver::default()),
        }
    }
}

// =============================================================================
// TOP LEVEL
// =============================================================================

/// Complete labelcheck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

impl Config {
    /// Load from the file named by `LABELCHECK_CONFIG`, or from environment
    /// variables when it is unset.
    pub fn load() -> ConfigResult<Self> {
        match std::env::var(defaults::ENV_CONFIG) {
            Ok(path) if !path.is_empty() => {
                info!("Loading configuration from {}", path);
                Self::from_file(Path::new(&path))
            }
            _ => {
                debug!("No config file set, loading configuration from environment");
                Self::from_env()
            }
        }
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from `LABELCHECK_*` environment variables over the defaults.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup over the defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(defaults::ENV_API_BASE_URL) {
            config.api.base_url = url;
        }
        if let Some(endpoint) = get(defaults::ENV_VERIFY_ENDPOINT) {
            config.api.verify_endpoint = endpoint.parse()?;
        }
        if let Some(top_k) = get(defaults::ENV_TOP_K) {
            config.api.top_k = Some(parse_number(defaults::ENV_TOP_K, &top_k)?);
        }
        if let Some(secs) = get(defaults::ENV_REQUEST_TIMEOUT_SECS) {
            config.api.request_timeout_secs =
                parse_number(defaults::ENV_REQUEST_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = get(defaults::ENV_VERIFY_TIMEOUT_SECS) {
            config.api.verify_timeout_secs =
                parse_number(defaults::ENV_VERIFY_TIMEOUT_SECS, &secs)?;
        }
        if let Some(end_page) = get(defaults::ENV_END_PAGE) {
            config.collection.end_page = parse_number(defaults::ENV_END_PAGE, &end_page)?;
        }
        if let Some(collection) = get(defaults::ENV_COLLECTION) {
            config.collection.select(collection);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.collection.validate()
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::Validation(format!("{} must be a positive integer, got: {}", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ==========================================================================
    // Defaults
    // ==========================================================================

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.verify_endpoint, VerifyEndpoint::Hybrid);
        assert_eq!(config.api.top_k, None);
        assert_eq!(config.api.verify_timeout_secs, 60);
        assert_eq!(config.collection.mode, CollectionMode::Keyword);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_verify_endpoint_paths() {
        assert_eq!(
            VerifyEndpoint::Hybrid.path(),
            "/rag/hybrid-single-verify-claim"
        );
        assert_eq!(VerifyEndpoint::Single.path(), "/rag/single-verify-claim");
    }

    #[test]
    fn test_verify_endpoint_from_str() {
        assert_eq!("HYBRID".parse::<VerifyEndpoint>().unwrap(), VerifyEndpoint::Hybrid);
        assert_eq!(" single ".parse::<VerifyEndpoint>().unwrap(), VerifyEndpoint::Single);
        assert!("dense".parse::<VerifyEndpoint>().is_err());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = ApiConfig {
            base_url: "http://backend:8000/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.url("/files/upload"), "http://backend:8000/files/upload");
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut api = ApiConfig::default();
        api.base_url = "backend:8000".to_string();
        assert!(api.validate().is_err());
        api.base_url = String::new();
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut api = ApiConfig::default();
        api.verify_timeout_secs = 0;
        assert!(api.validate().is_err());

        let mut api = ApiConfig::default();
        api.top_k = Some(0);
        assert!(api.validate().is_err());

        let mut collection = CollectionConfig::default();
        collection.end_page = 0;
        assert!(collection.validate().is_err());
    }

    #[test]
    fn test_fixed_mode_requires_collection() {
        let collection = CollectionConfig {
            mode: CollectionMode::Fixed,
            fixed: Some("  ".to_string()),
            end_page: 1,
        };
        assert!(collection.validate().is_err());
    }

    // ==========================================================================
    // Strategy
    // ==========================================================================

    #[test]
    fn test_keyword_strategy_by_default() {
        let strategy = CollectionConfig::default().strategy();
        assert!(strategy.preselected().is_none());
    }

    #[test]
    fn test_select_switches_to_fixed() {
        let mut collection = CollectionConfig::default();
        collection.end_page = 3;
        collection.select("label_poc_4");
        let strategy = collection.strategy();
        assert_eq!(
            strategy.preselected(),
            Some(&CollectionBinding::new("label_poc_4", 3))
        );
    }

    // ==========================================================================
    // Loading
    // ==========================================================================

    #[test]
    fn test_from_toml_full() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "https://labels.example.com"
            verify_endpoint = "single"
            top_k = 5
            verify_timeout_secs = 90

            [collection]
            mode = "fixed"
            fixed = "label_poc_2"
            end_page = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://labels.example.com");
        assert_eq!(config.api.verify_endpoint, VerifyEndpoint::Single);
        assert_eq!(config.api.top_k, Some(5));
        assert_eq!(config.api.verify_timeout_secs, 90);
        assert_eq!(config.api.request_timeout_secs, 300);
        assert_eq!(config.collection.fixed.as_deref(), Some("label_poc_2"));
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.base_url, defaults::API_BASE_URL);
        assert_eq!(config.collection.end_page, 1);
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = Config::from_toml("[api]\nverify_endpoint = \"dense\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labelcheck.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://10.0.0.5:8000\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Path::new("/nonexistent/labelcheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LABELCHECK_API_BASE_URL", "http://api:9000"),
            ("LABELCHECK_VERIFY_ENDPOINT", "single"),
            ("LABELCHECK_TOP_K", "8"),
            ("LABELCHECK_VERIFY_TIMEOUT_SECS", "45"),
            ("LABELCHECK_COLLECTION", "label_poc_3"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url, "http://api:9000");
        assert_eq!(config.api.verify_endpoint, VerifyEndpoint::Single);
        assert_eq!(config.api.top_k, Some(8));
        assert_eq!(config.api.verify_timeout_secs, 45);
        assert_eq!(config.collection.mode, CollectionMode::Fixed);
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = Config::from_lookup(lookup(&[("LABELCHECK_COLLECTION", "")])).unwrap();
        assert_eq!(config.collection.mode, CollectionMode::Keyword);
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let err = Config::from_lookup(lookup(&[("LABELCHECK_TOP_K", "many")])).unwrap_err();
        assert!(err.to_string().contains("LABELCHECK_TOP_K"));
    }

    #[test]
    fn test_config_error_into_core_error() {
        let err: labelcheck_core::Error = ConfigError::Validation("x".to_string()).into();
        assert!(matches!(err, labelcheck_core::Error::Config(_)));
    }
}
