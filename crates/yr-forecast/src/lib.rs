//! Forecast client for the Yr weather service.
//!
//! Resolves a place path or coordinates to a fetch target, serves documents
//! from a metadata-expiring file cache, and exposes the forecast as
//! time-bucketed records with window aggregation on top.

pub mod cache;
pub mod client;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod language;
pub mod target;
pub mod xml;

pub use cache::{ForecastCache, Freshness};
pub use client::{Forecast, ForecastClient, ForecastRequest};
pub use document::{ForecastDocument, Precipitation, Symbol, WeatherRecord, WindDirection};
pub use error::{Field, ForecastError, Result};
pub use extract::{TimeWindow, WindowAggregator, WindowSummary};
pub use fetcher::Fetcher;
pub use language::{Credit, Language};
pub use target::{Coordinates, FetchTarget, ForecastKind, ForecastVariant, LocationResolver};
