//! Summary statistics over a time window of forecast records.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::document::WeatherRecord;
use crate::error::{Field, ForecastError, Result};

/// Closed interval of local times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }
}

/// All aggregates of a window at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSummary {
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub min_wind_speed: f64,
    pub max_wind_speed: f64,
    pub min_precipitation: f64,
    pub max_precipitation: f64,
}

/// Records falling inside a [`TimeWindow`], with min/max/sum reductions.
///
/// Input must be in chronological order: records starting before the window
/// are skipped, and consumption stops at the first record ending after it.
#[derive(Debug, Clone)]
pub struct WindowAggregator<'a> {
    window: TimeWindow,
    records: Vec<&'a WeatherRecord>,
}

impl<'a> WindowAggregator<'a> {
    pub fn new<I>(records: I, window: TimeWindow) -> Self
    where
        I: IntoIterator<Item = &'a WeatherRecord>,
    {
        let records = records
            .into_iter()
            .filter(|r| r.from >= window.start)
            .take_while(|r| r.to <= window.end)
            .collect();
        Self { window, records }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Records that passed the window filter.
    pub fn records(&self) -> &[&'a WeatherRecord] {
        &self.records
    }

    pub fn min_temperature(&self) -> Result<f64> {
        self.reduce(Field::Temperature, |r| r.temperature, f64::min)
    }

    pub fn max_temperature(&self) -> Result<f64> {
        self.reduce(Field::Temperature, |r| r.temperature, f64::max)
    }

    pub fn min_wind_speed(&self) -> Result<f64> {
        self.reduce(Field::WindSpeed, |r| r.wind_speed, f64::min)
    }

    pub fn max_wind_speed(&self) -> Result<f64> {
        self.reduce(Field::WindSpeed, |r| r.wind_speed, f64::max)
    }

    /// Total of the per-interval lower precipitation bounds.
    pub fn min_precipitation(&self) -> Result<f64> {
        self.reduce(
            Field::PrecipitationMin,
            |r| r.precipitation.as_ref().and_then(|p| p.min),
            |sum, v| sum + v,
        )
    }

    /// Total of the per-interval upper precipitation bounds.
    pub fn max_precipitation(&self) -> Result<f64> {
        self.reduce(
            Field::PrecipitationMax,
            |r| r.precipitation.as_ref().and_then(|p| p.max),
            |sum, v| sum + v,
        )
    }

    pub fn summary(&self) -> Result<WindowSummary> {
        Ok(WindowSummary {
            min_temperature: self.min_temperature()?,
            max_temperature: self.max_temperature()?,
            min_wind_speed: self.min_wind_speed()?,
            max_wind_speed: self.max_wind_speed()?,
            min_precipitation: self.min_precipitation()?,
            max_precipitation: self.max_precipitation()?,
        })
    }

    /// Fold `field` over the in-window records that carry it.
    fn reduce(
        &self,
        field: Field,
        get: impl Fn(&WeatherRecord) -> Option<f64>,
        combine: impl Fn(f64, f64) -> f64,
    ) -> Result<f64> {
        if self.records.is_empty() {
            return Err(ForecastError::EmptyWindow);
        }
        self.records
            .iter()
            .filter_map(|&r| get(r))
            .reduce(combine)
            .ok_or(ForecastError::FieldUnavailable(field))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::document::Precipitation;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 3, 18)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(from: u32, temperature: f64, wind: Option<f64>, min: f64, max: f64) -> WeatherRecord {
        WeatherRecord {
            from: at(from),
            to: at(from + 1),
            temperature: Some(temperature),
            wind_speed: wind,
            precipitation: Some(Precipitation {
                value: None,
                min: Some(min),
                max: Some(max),
            }),
            wind_direction: None,
            symbol: None,
            pressure: None,
            raw: Value::Null,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let records = vec![
            record(10, 1.0, Some(1.0), 0.0, 0.0),
            record(11, 2.0, Some(2.0), 0.0, 0.0),
            record(12, 3.0, Some(3.0), 0.0, 0.0),
            record(13, 4.0, Some(4.0), 0.0, 0.0),
        ];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(11), at(13)));

        let included: Vec<_> = agg.records().iter().map(|r| r.from).collect();
        assert_eq!(included, vec![at(11), at(12)]);
        assert_eq!(agg.min_temperature().unwrap(), 2.0);
        assert_eq!(agg.max_temperature().unwrap(), 3.0);
    }

    #[test]
    fn test_stops_at_first_record_past_end() {
        // Out of order on purpose: anything after the first overshoot is ignored.
        let records = vec![
            record(11, 2.0, None, 0.0, 0.0),
            record(14, 9.0, None, 0.0, 0.0),
            record(12, -5.0, None, 0.0, 0.0),
        ];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(11), at(13)));
        assert_eq!(agg.records().len(), 1);
        assert_eq!(agg.min_temperature().unwrap(), 2.0);
    }

    #[test]
    fn test_precipitation_is_summed() {
        let records = vec![
            record(11, 0.0, None, 0.1, 1.0),
            record(12, 0.0, None, 0.5, 2.0),
            record(13, 0.0, None, 0.3, 3.0),
        ];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(11), at(14)));
        assert!(close(agg.min_precipitation().unwrap(), 0.9));
        assert!(close(agg.max_precipitation().unwrap(), 6.0));
    }

    #[test]
    fn test_empty_window() {
        let records = vec![record(11, 2.0, Some(3.0), 0.1, 0.2)];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(15), at(18)));

        assert!(matches!(agg.min_temperature(), Err(ForecastError::EmptyWindow)));
        assert!(matches!(agg.max_wind_speed(), Err(ForecastError::EmptyWindow)));
        assert!(matches!(agg.min_precipitation(), Err(ForecastError::EmptyWindow)));
        assert!(matches!(agg.summary(), Err(ForecastError::EmptyWindow)));
    }

    #[test]
    fn test_missing_field_does_not_break_others() {
        let records = vec![
            record(11, 2.0, None, 0.1, 0.2),
            record(12, 4.0, None, 0.1, 0.2),
        ];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(11), at(13)));

        assert_eq!(agg.max_temperature().unwrap(), 4.0);
        assert!(matches!(
            agg.min_wind_speed(),
            Err(ForecastError::FieldUnavailable(Field::WindSpeed))
        ));
    }

    #[test]
    fn test_partially_present_field() {
        let records = vec![
            record(11, 2.0, Some(5.5), 0.0, 0.0),
            record(12, 4.0, None, 0.0, 0.0),
            record(13, 1.0, Some(2.5), 0.0, 0.0),
        ];
        let agg = WindowAggregator::new(&records, TimeWindow::new(at(11), at(14)));
        assert_eq!(agg.min_wind_speed().unwrap(), 2.5);
        assert_eq!(agg.max_wind_speed().unwrap(), 5.5);
    }
}
