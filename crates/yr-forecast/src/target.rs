//! Resolve a place name or coordinates into a URL and cache key.

use serde::{Deserialize, Serialize};
use yr_core::{ConfigError, ServiceConfig};

use crate::error::Result;
use crate::language::Language;

/// Which backing service produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastKind {
    /// Named-location service, `weatherdata/forecast/tabular/time`.
    Named,
    /// Coordinate API, `weatherdata/product/time`.
    Api,
}

/// Forecast product for named locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastVariant {
    #[default]
    Forecast,
    ForecastHourByHour,
}

impl ForecastVariant {
    /// Parse a variant token. Unknown tokens fall back to the default
    /// variant instead of failing.
    pub fn from_token(token: &str) -> Self {
        match token {
            "forecast" => Self::Forecast,
            "forecast_hour_by_hour" => Self::ForecastHourByHour,
            other => {
                tracing::warn!("unknown forecast variant '{}', using default", other);
                Self::default()
            }
        }
    }

    /// URL path segment for this variant in the given language.
    pub fn segment<'a>(&self, language: &'a Language) -> &'a str {
        match self {
            Self::Forecast => &language.forecast,
            Self::ForecastHourByHour => &language.forecast_hour_by_hour,
        }
    }
}

/// Latitude, longitude and altitude in metres above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub msl: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, msl: f64) -> Self {
        Self {
            latitude,
            longitude,
            msl,
        }
    }

    /// Build from an x/y/z triple, i.e. (longitude, latitude, altitude).
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(y, x, z)
    }

    fn query(&self) -> String {
        format!(
            "lat={};lon={};msl={}",
            self.latitude, self.longitude, self.msl
        )
    }
}

/// A resolved request: where to fetch and where to cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    url: String,
    cache_key: String,
    kind: ForecastKind,
    label: String,
}

impl FetchTarget {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn kind(&self) -> ForecastKind {
        self.kind
    }

    /// Location name or coordinate query, for logging.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Builds [`FetchTarget`]s from the configured service endpoints.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    named_base_url: String,
    api_base_url: String,
}

const NAMED_EXTENSION: &str = "xml";
const API_FORECAST_LINK: &str = "locationforecast";

impl LocationResolver {
    pub fn new(service: &ServiceConfig) -> Self {
        Self {
            named_base_url: service.named_base_url.clone(),
            api_base_url: service.api_base_url.clone(),
        }
    }

    /// Resolve a location name or coordinates into a target.
    ///
    /// The name takes precedence when both are given. `variant` only applies
    /// to named locations; coordinates always use the API scheme.
    pub fn resolve(
        &self,
        location_name: Option<&str>,
        coordinates: Option<Coordinates>,
        variant: &str,
        language: &Language,
    ) -> Result<FetchTarget> {
        if let Some(name) = location_name.filter(|n| !n.is_empty()) {
            return Ok(self.named(name, ForecastVariant::from_token(variant), language));
        }
        if let Some(coordinates) = coordinates {
            return Ok(self.coordinates(coordinates));
        }
        Err(ConfigError::MissingSetting("location_name or coordinates".to_string()).into())
    }

    /// Target on the named-location service.
    pub fn named(&self, name: &str, variant: ForecastVariant, language: &Language) -> FetchTarget {
        let segment = variant.segment(language);
        let encoded = name
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        FetchTarget {
            url: format!(
                "{}{}/{}/{}.{}",
                self.named_base_url, language.place, encoded, segment, NAMED_EXTENSION
            ),
            cache_key: format!("{}.{}", name.replace('/', "-"), segment),
            kind: ForecastKind::Named,
            label: name.to_string(),
        }
    }

    /// Target on the coordinate API.
    pub fn coordinates(&self, coordinates: Coordinates) -> FetchTarget {
        let query = coordinates.query();
        FetchTarget {
            url: format!("{}{}", self.api_base_url, query),
            cache_key: format!("{}.{}", query, API_FORECAST_LINK),
            kind: ForecastKind::Api,
            label: query,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::ForecastError;

    fn resolver() -> LocationResolver {
        LocationResolver::new(&ServiceConfig::default())
    }

    #[test]
    fn test_named_forecast_url_and_key() {
        let en = Language::load("en").unwrap();
        let target = resolver()
            .resolve(Some("Czech_Republic/Prague/Prague"), None, "forecast", &en)
            .unwrap();

        assert_eq!(
            target.url(),
            "http://www.yr.no/place/Czech_Republic/Prague/Prague/forecast.xml"
        );
        assert_eq!(target.cache_key(), "Czech_Republic-Prague-Prague.forecast");
        assert_eq!(target.kind(), ForecastKind::Named);
    }

    #[test]
    fn test_named_hour_by_hour_translated_and_encoded() {
        let nb = Language::load("nb").unwrap();
        let target = resolver()
            .resolve(
                Some("Norge/Trøndelag/Trondheim/Tyholt"),
                None,
                "forecast_hour_by_hour",
                &nb,
            )
            .unwrap();

        assert_eq!(
            target.url(),
            "http://www.yr.no/sted/Norge/Tr%C3%B8ndelag/Trondheim/Tyholt/varsel_time_for_time.xml"
        );
        assert_eq!(
            target.cache_key(),
            "Norge-Trøndelag-Trondheim-Tyholt.varsel_time_for_time"
        );
    }

    #[test]
    fn test_invalid_variant_falls_back_to_default() {
        let en = Language::load("en").unwrap();
        let fallback = resolver()
            .resolve(Some("Norway/Oslo/Oslo/Oslo"), None, "hourly_please", &en)
            .unwrap();
        let default = resolver()
            .resolve(Some("Norway/Oslo/Oslo/Oslo"), None, "forecast", &en)
            .unwrap();
        assert_eq!(fallback, default);
    }

    #[test]
    fn test_coordinates_ignore_variant() {
        let en = Language::load("en").unwrap();
        let coords = Coordinates::new(50.0596696, 14.4656239, 11.0);
        let a = resolver()
            .resolve(None, Some(coords), "forecast", &en)
            .unwrap();
        let b = resolver()
            .resolve(None, Some(coords), "forecast_hour_by_hour", &en)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.kind(), ForecastKind::Api);
        assert_eq!(
            a.url(),
            "https://api.met.no/weatherapi/locationforecast/1.9/?lat=50.0596696;lon=14.4656239;msl=11"
        );
        assert_eq!(
            a.cache_key(),
            "lat=50.0596696;lon=14.4656239;msl=11.locationforecast"
        );
    }

    #[test]
    fn test_xyz_matches_explicit_coordinates() {
        let en = Language::load("en").unwrap();
        let xyz = Coordinates::from_xyz(14.4656239, 50.0596696, 11.0);
        let explicit = Coordinates::new(50.0596696, 14.4656239, 11.0);

        let a = resolver().resolve(None, Some(xyz), "forecast", &en).unwrap();
        let b = resolver()
            .resolve(None, Some(explicit), "forecast", &en)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_name_takes_precedence_over_coordinates() {
        let en = Language::load("en").unwrap();
        let target = resolver()
            .resolve(
                Some("Norway/Oslo/Oslo/Oslo"),
                Some(Coordinates::new(59.9, 10.7, 0.0)),
                "forecast",
                &en,
            )
            .unwrap();
        assert_eq!(target.kind(), ForecastKind::Named);
    }

    #[test]
    fn test_missing_location_is_configuration_error() {
        let en = Language::load("en").unwrap();
        let err = resolver().resolve(None, None, "forecast", &en).unwrap_err();
        assert!(matches!(err, ForecastError::Configuration(_)));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let nb = Language::load("nb").unwrap();
        let first = resolver()
            .resolve(Some("Norge/Oslo/Oslo/Oslo"), None, "forecast", &nb)
            .unwrap();
        for _ in 0..3 {
            let again = resolver()
                .resolve(Some("Norge/Oslo/Oslo/Oslo"), None, "forecast", &nb)
                .unwrap();
            assert_eq!(again, first);
        }
    }
}
