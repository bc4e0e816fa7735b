use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::EmptyPlaceQuery, icon::WeatherIcon};

/// Free-text place name handed to the provider as-is.
///
/// Only emptiness is checked; resolving ambiguous names is up to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceQuery(String);

impl PlaceQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PlaceQuery {
    type Error = EmptyPlaceQuery;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptyPlaceQuery);
        }
        Ok(PlaceQuery(trimmed.to_string()))
    }
}

impl TryFrom<String> for PlaceQuery {
    type Error = EmptyPlaceQuery;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlaceQuery::try_from(value.as_str())
    }
}

impl From<PlaceQuery> for String {
    fn from(value: PlaceQuery) -> Self {
        value.0
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary weather entry of a provider sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    /// Provider icon code, e.g. `"01d"`.
    pub icon: String,
}

impl Condition {
    pub fn glyph(&self) -> WeatherIcon {
        WeatherIcon::from_code(&self.icon)
    }
}

/// Current conditions for the resolved place, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Visibility in metres; the provider omits it for some stations.
    pub visibility_m: Option<u32>,
    pub condition: Condition,
    pub observation_time: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn rounded_temperature(&self) -> i32 {
        round_half_up(self.temperature_c)
    }

    pub fn rounded_feels_like(&self) -> i32 {
        round_half_up(self.feels_like_c)
    }

    pub fn visibility_km(&self) -> Option<i32> {
        self.visibility_m
            .map(|metres| round_half_up(f64::from(metres) / 1000.0))
    }
}

/// One entry of the five-day forecast strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Short weekday name, e.g. `"Mon"`.
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub temperature_c: i32,
    pub humidity_pct: u8,
    pub condition: Condition,
}

/// One day of the trailing-week series.
///
/// Points produced by [`crate::history::SyntheticHistory`] carry
/// `synthetic = true` and must not be presented as measured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Short month and day, e.g. `"Oct 13"`.
    pub label: String,
    pub date: NaiveDate,
    /// Rounded to one decimal.
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u16,
    pub synthetic: bool,
}

/// Forecast payload exactly as the provider returned it.
///
/// Interpreting the samples is left to [`crate::forecast::normalize_forecast`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast(pub serde_json::Value);

/// Rounds to the nearest integer with halves going up (`-2.5` becomes `-2`).
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Rounds to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
