//! Parsed forecast documents and their per-interval records.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ForecastError, Result};
use crate::target::ForecastKind;
use crate::xml;

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindDirection {
    pub deg: Option<f64>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub number: Option<String>,
    pub name: Option<String>,
    pub var: Option<String>,
}

/// One forecast interval.
///
/// Typed fields are optional because non-hourly forecasts and API entries
/// carry different subsets. `raw` keeps the parsed subtree for output.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<Precipitation>,
    pub wind_direction: Option<WindDirection>,
    pub symbol: Option<Symbol>,
    pub pressure: Option<f64>,
    pub raw: Value,
}

impl WeatherRecord {
    /// Build a record from one `time` element of a `kind` document.
    pub fn from_value(value: &Value, kind: ForecastKind) -> Result<Self> {
        let from = parse_timestamp(value, "@from", kind)?;
        let to = parse_timestamp(value, "@to", kind)?;

        // API entries nest their measurements one level down.
        let body = match value.get("location") {
            Some(location) if location.is_object() => location,
            _ => value,
        };

        let precipitation = body.get("precipitation").filter(|p| p.is_object()).map(|p| {
            Precipitation {
                value: number(p, "@value"),
                min: number(p, "@minvalue"),
                max: number(p, "@maxvalue"),
            }
        });

        let wind_direction = body
            .get("windDirection")
            .filter(|w| w.is_object())
            .map(|w| WindDirection {
                deg: number(w, "@deg"),
                code: text(w, "@code")
                    .or_else(|| text(w, "@name").filter(|n| n.len() <= 3)),
                name: text(w, "@name"),
            });

        let symbol = body.get("symbol").filter(|s| s.is_object()).map(|s| Symbol {
            number: text(s, "@number"),
            name: text(s, "@name"),
            var: text(s, "@var").or_else(|| text(s, "@id")),
        });

        Ok(Self {
            from,
            to,
            temperature: body.get("temperature").and_then(|t| number(t, "@value")),
            wind_speed: body.get("windSpeed").and_then(|w| number(w, "@mps")),
            precipitation,
            wind_direction,
            symbol,
            pressure: body.get("pressure").and_then(|p| number(p, "@value")),
            raw: value.clone(),
        })
    }

    /// The record as pretty-printed JSON, keys as in the source document.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.raw).map_err(|e| ForecastError::Parse(e.to_string()))
    }
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_str()?.trim().parse().ok()
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// Parse `@from`/`@to`. Named documents carry local time without an offset;
/// API documents carry UTC, converted here to local time.
fn parse_timestamp(value: &Value, key: &str, kind: ForecastKind) -> Result<NaiveDateTime> {
    let raw = value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ForecastError::Parse(format!("time element without {}", key)))?;

    let parsed = match kind {
        ForecastKind::Named => NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT),
        ForecastKind::Api => raw
            .parse::<DateTime<Utc>>()
            .map(|utc| utc.with_timezone(&Local).naive_local()),
    };
    parsed.map_err(|e| ForecastError::Parse(format!("{} '{}': {}", key, raw, e)))
}

/// A parsed document paired with the service variant that produced it.
#[derive(Debug, Clone)]
pub struct ForecastDocument {
    kind: ForecastKind,
    tree: Value,
    records: Vec<WeatherRecord>,
}

impl ForecastDocument {
    /// Parse raw markup fetched for a target of `kind`.
    pub fn parse(raw: &str, kind: ForecastKind) -> Result<Self> {
        Self::from_tree(xml::parse(raw)?, kind)
    }

    /// Wrap an already-parsed tree.
    pub fn from_tree(tree: Value, kind: ForecastKind) -> Result<Self> {
        let container = match kind {
            ForecastKind::Api => tree.pointer("/weatherdata/product"),
            ForecastKind::Named => tree.pointer("/weatherdata/forecast/tabular"),
        }
        .ok_or_else(|| ForecastError::Parse(format!("{:?} document has no time list", kind)))?;

        let records = match container.get("time") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| WeatherRecord::from_value(item, kind))
                .collect::<Result<Vec<_>>>()?,
            Some(item @ Value::Object(_)) => vec![WeatherRecord::from_value(item, kind)?],
            _ => Vec::new(),
        };

        tracing::debug!("parsed {} forecast records", records.len());
        Ok(Self {
            kind,
            tree,
            records,
        })
    }

    pub fn kind(&self) -> ForecastKind {
        self.kind
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Records in document order. Can be iterated any number of times.
    pub fn records(&self) -> impl Iterator<Item = &WeatherRecord> + Clone + '_ {
        self.records.iter()
    }

    /// The earliest record.
    pub fn first(&self) -> Result<&WeatherRecord> {
        self.records.first().ok_or(ForecastError::EmptyForecast)
    }

    /// The document written back out as markup.
    pub fn to_xml(&self) -> Result<String> {
        xml::unparse(&self.tree)
    }
}
