//! Forecast pipeline error types.

use thiserror::Error;

/// Per-record field an aggregate is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    WindSpeed,
    PrecipitationMin,
    PrecipitationMax,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Temperature => "temperature.value",
            Field::WindSpeed => "windSpeed.mps",
            Field::PrecipitationMin => "precipitation.minvalue",
            Field::PrecipitationMax => "precipitation.maxvalue",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] yr_core::ConfigError),

    #[error("Upstream returned {status} for {url}")]
    Upstream { status: u16, url: String },

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Cached metadata could not be read. Only used inside the cache, where
    /// it is recovered as a stale entry.
    #[error("Unreadable cache metadata: {0}")]
    CacheRead(String),

    #[error("Cache I/O failed for {key}: {source}")]
    CacheIo {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Language table error: {0}")]
    Language(String),

    #[error("Forecast contains no records")]
    EmptyForecast,

    #[error("No forecast records inside the requested window")]
    EmptyWindow,

    #[error("Field {0} is absent from every record in the window")]
    FieldUnavailable(Field),
}

impl ForecastError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(e) => e.user_message().to_string(),
            Self::Upstream { status, .. } if *status >= 500 => {
                "The forecast service is experiencing issues. Please try again later.".to_string()
            }
            Self::Upstream { status, .. } => {
                format!("The forecast service rejected the request ({}).", status)
            }
            Self::HttpClient(_) => "The HTTP client could not be set up.".to_string(),
            Self::Fetch { .. } => "Unable to reach the forecast service.".to_string(),
            Self::CacheRead(_) | Self::CacheIo { .. } => "Local cache error".to_string(),
            Self::Parse(_) => "Received an unreadable forecast.".to_string(),
            Self::Language(msg) => format!("Unsupported language: {}", msg),
            Self::EmptyForecast => "The forecast is empty.".to_string(),
            Self::EmptyWindow => "No forecast data for the selected period.".to_string(),
            Self::FieldUnavailable(field) => {
                format!("This forecast does not include {}.", field)
            }
        }
    }

    /// Whether a later attempt could succeed. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status >= 500 || *status == 429,
            Self::Fetch { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
