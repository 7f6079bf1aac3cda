use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Language codes that ship with an embedded lookup table.
pub const KNOWN_LANGUAGES: [&str; 3] = ["en", "nb", "nn"];

/// Forecast variant tokens understood by the named-location service.
pub const FORECAST_VARIANTS: [&str; 2] = ["forecast", "forecast_hour_by_hour"];

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast selection defaults
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Upstream service endpoints
    #[serde(default)]
    pub service: ServiceConfig,

    /// Local document cache
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Language code used to look up URL path segments and the credit line
    #[serde(default = "default_language")]
    pub language: String,

    /// Forecast variant token (`forecast` or `forecast_hour_by_hour`)
    #[serde(default = "default_variant")]
    pub variant: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_variant() -> String {
    "forecast".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            variant: default_variant(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the named-location service, including the trailing slash
    #[serde(default = "default_named_base_url")]
    pub named_base_url: String,

    /// Base URL of the coordinate API, up to and including the query marker
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional transport timeout. No timeout is applied when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_named_base_url() -> String {
    "http://www.yr.no/".to_string()
}

fn default_api_base_url() -> String {
    "https://api.met.no/weatherapi/locationforecast/1.9/?".to_string()
}

fn default_user_agent() -> String {
    format!("yr/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            named_base_url: default_named_base_url(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per cache key
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    /// File extension appended to every cache key
    #[serde(default = "default_cache_extension")]
    pub extension: String,
}

fn default_cache_directory() -> PathBuf {
    std::env::temp_dir()
}

fn default_cache_extension() -> String {
    "xml".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            extension: default_cache_extension(),
        }
    }
}

impl CacheConfig {
    /// Cache rooted at an explicit directory, e.g. a per-test temp dir.
    pub fn in_dir(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extension: default_cache_extension(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.service.named_base_url,
            "service.named_base_url",
            &mut result,
        );
        self.validate_url(
            &self.service.api_base_url,
            "service.api_base_url",
            &mut result,
        );

        if !self.service.named_base_url.ends_with('/') {
            result.add_warning(
                "service.named_base_url",
                "Base URL should end with '/' so path segments join correctly",
            );
        }

        if !KNOWN_LANGUAGES.contains(&self.forecast.language.as_str()) {
            result.add_warning(
                "forecast.language",
                format!(
                    "No built-in table for language '{}' (known: {})",
                    self.forecast.language,
                    KNOWN_LANGUAGES.join(", ")
                ),
            );
        }

        // Unknown variants fall back to the default rather than failing.
        if !FORECAST_VARIANTS.contains(&self.forecast.variant.as_str()) {
            result.add_warning(
                "forecast.variant",
                format!(
                    "Unknown variant '{}', the default forecast will be used",
                    self.forecast.variant
                ),
            );
        }

        if self.cache.extension.is_empty() {
            result.add_error("cache.extension", "Cache file extension must not be empty");
        }

        if self.cache.directory.exists() && !self.cache.directory.is_dir() {
            result.add_error(
                "cache.directory",
                format!(
                    "Path is not a directory: {}",
                    self.cache.directory.display()
                ),
            );
        }

        if self.service.request_timeout_secs == Some(0) {
            result.add_error(
                "service.request_timeout_secs",
                "Timeout must be greater than 0 when set",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("yr");

        Ok(config_dir.join("config.toml"))
    }
}
