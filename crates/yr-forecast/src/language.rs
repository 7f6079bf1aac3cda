//! Per-language URL path segments and credit lines.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ForecastError, Result};

const EN: &str = include_str!("languages/en.json");
const NB: &str = include_str!("languages/nb.json");
const NN: &str = include_str!("languages/nn.json");

/// Attribution the service asks clients to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub text: String,
    pub url: String,
}

/// Lookup table for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(skip)]
    pub code: String,
    pub place: String,
    pub forecast: String,
    pub forecast_hour_by_hour: String,
    pub credit: Credit,
}

impl Language {
    /// Load one of the built-in tables (`en`, `nb`, `nn`).
    pub fn load(code: &str) -> Result<Self> {
        let raw = match code {
            "en" => EN,
            "nb" => NB,
            "nn" => NN,
            other => {
                return Err(ForecastError::Language(format!(
                    "no table for language '{}'",
                    other
                )))
            }
        };
        tracing::info!("read language dictionary: {}", code);
        Self::from_json(code, raw)
    }

    /// Load a table from a JSON file on disk.
    pub fn from_path(code: &str, path: &Path) -> Result<Self> {
        tracing::info!("read language dictionary: {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Language(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(code, &raw)
    }

    fn from_json(code: &str, raw: &str) -> Result<Self> {
        let mut language: Language = serde_json::from_str(raw)
            .map_err(|e| ForecastError::Language(format!("malformed table '{}': {}", code, e)))?;
        language.code = code.to_string();
        Ok(language)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self {
            code: "en".to_string(),
            place: "place".to_string(),
            forecast: "forecast".to_string(),
            forecast_hour_by_hour: "forecast_hour_by_hour".to_string(),
            credit: Credit {
                text: "Weather forecast from Yr, delivered by the Norwegian Meteorological Institute and NRK".to_string(),
                url: "http://www.yr.no/".to_string(),
            },
        }
    }
}
