//! Caller-facing forecast API.

use chrono::NaiveDateTime;
use tracing::instrument;
use yr_core::Config;

use crate::cache::ForecastCache;
use crate::document::{ForecastDocument, WeatherRecord};
use crate::error::{ForecastError, Result};
use crate::extract::{TimeWindow, WindowAggregator};
use crate::fetcher::Fetcher;
use crate::language::{Credit, Language};
use crate::target::{Coordinates, FetchTarget, LocationResolver};

/// What to fetch: a place path or a coordinate triple, plus the variant.
#[derive(Debug, Clone, Default)]
pub struct ForecastRequest {
    pub location_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub variant: String,
}

impl ForecastRequest {
    /// Named location, e.g. `Norway/Oslo/Oslo/Oslo`.
    pub fn named(location_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            location_name: Some(location_name.into()),
            coordinates: None,
            variant: variant.into(),
        }
    }

    pub fn coordinates(coordinates: Coordinates) -> Self {
        Self {
            location_name: None,
            coordinates: Some(coordinates),
            variant: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    resolver: LocationResolver,
    fetcher: Fetcher,
    language: Language,
}

impl ForecastClient {
    /// Client using the built-in table for `config.forecast.language`.
    pub fn new(config: &Config) -> Result<Self> {
        let language = Language::load(&config.forecast.language)?;
        Self::with_language(config, language)
    }

    /// Client using a caller-supplied table, e.g. one read with
    /// [`Language::from_path`].
    pub fn with_language(config: &Config, language: Language) -> Result<Self> {
        let cache = ForecastCache::new(&config.cache);
        Ok(Self {
            resolver: LocationResolver::new(&config.service),
            fetcher: Fetcher::new(&config.service, cache)?,
            language,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn resolve(&self, request: &ForecastRequest) -> Result<FetchTarget> {
        self.resolver.resolve(
            request.location_name.as_deref(),
            request.coordinates,
            &request.variant,
            &self.language,
        )
    }

    /// Fetch (or load from cache) and parse the forecast once.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, request: &ForecastRequest) -> Result<Forecast> {
        let target = self.resolve(request)?;
        let raw = self.fetcher.fetch(&target).await?;
        let document = ForecastDocument::parse(&raw, target.kind())?;
        Ok(Forecast {
            target,
            document,
            credit: self.language.credit.clone(),
        })
    }

    /// Drop the cached document for a request, if any.
    pub fn purge(&self, request: &ForecastRequest) -> Result<()> {
        let target = self.resolve(request)?;
        self.fetcher.cache().purge(target.cache_key());
        Ok(())
    }
}

/// A fetched forecast. All accessors work on the document parsed at fetch
/// time; none of them touch the network again.
#[derive(Debug, Clone)]
pub struct Forecast {
    target: FetchTarget,
    document: ForecastDocument,
    credit: Credit,
}

impl Forecast {
    pub fn target(&self) -> &FetchTarget {
        &self.target
    }

    pub fn document(&self) -> &ForecastDocument {
        &self.document
    }

    pub fn credit(&self) -> &Credit {
        &self.credit
    }

    /// The first chronological record.
    pub fn current(&self) -> Result<&WeatherRecord> {
        self.document.first()
    }

    pub fn all(&self) -> impl Iterator<Item = &WeatherRecord> + Clone + '_ {
        self.document.records()
    }

    pub fn current_json(&self) -> Result<String> {
        self.current()?.to_json()
    }

    /// Every record as one pretty-printed JSON array.
    pub fn all_json(&self) -> Result<String> {
        let raw: Vec<_> = self.all().map(|r| &r.raw).collect();
        serde_json::to_string_pretty(&raw).map_err(|e| ForecastError::Parse(e.to_string()))
    }

    pub fn to_xml(&self) -> Result<String> {
        self.document.to_xml()
    }

    /// Aggregates over `[start, end]`.
    pub fn window(&self, start: NaiveDateTime, end: NaiveDateTime) -> WindowAggregator<'_> {
        WindowAggregator::new(self.all(), TimeWindow::new(start, end))
    }
}
