//! Downsampling of the 3-hour forecast series to one entry per day.
//!
//! The provider returns 40 samples spaced three hours apart. Every
//! [`SAMPLES_PER_DAY`]th sample starting at index 0 is taken as that day's
//! representative, then the first [`FORECAST_DAYS`] of those are kept.
//!
//! The day boundary is positional: if the series does not start at a
//! consistent hour, the chosen samples drift relative to calendar days.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::MalformedForecastError,
    model::{Condition, ForecastDay, RawForecast, round_half_up},
};

pub const SAMPLES_PER_DAY: usize = 8;
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
struct Sample {
    dt: i64,
    main: SampleMain,
    weather: Vec<SampleWeather>,
}

#[derive(Debug, Deserialize)]
struct SampleMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct SampleWeather {
    description: String,
    icon: String,
}

/// Reduces a raw forecast payload to at most [`FORECAST_DAYS`] display records.
///
/// Fewer records are produced when the payload is shorter than
/// `SAMPLES_PER_DAY * (FORECAST_DAYS - 1) + 1` samples.
pub fn normalize_forecast(raw: &RawForecast) -> Result<Vec<ForecastDay>, MalformedForecastError> {
    let list = raw
        .0
        .get("list")
        .and_then(serde_json::Value::as_array)
        .ok_or(MalformedForecastError::MissingList)?;

    if list.is_empty() {
        return Err(MalformedForecastError::NoSamples);
    }

    let offset = utc_offset(raw);

    let days = list
        .iter()
        .enumerate()
        .step_by(SAMPLES_PER_DAY)
        .take(FORECAST_DAYS)
        .map(|(index, value)| to_forecast_day(index, value, offset))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(samples = list.len(), days = days.len(), "Normalized forecast");

    Ok(days)
}

fn to_forecast_day(
    index: usize,
    value: &serde_json::Value,
    offset: FixedOffset,
) -> Result<ForecastDay, MalformedForecastError> {
    let invalid = |reason: String| MalformedForecastError::InvalidSample { index, reason };

    let sample = Sample::deserialize(value).map_err(|e| invalid(e.to_string()))?;

    let primary = sample
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| invalid("no weather entry".to_string()))?;

    let timestamp = DateTime::<Utc>::from_timestamp(sample.dt, 0)
        .ok_or_else(|| invalid(format!("timestamp {} out of range", sample.dt)))?;

    Ok(ForecastDay {
        label: timestamp.with_timezone(&offset).format("%a").to_string(),
        timestamp,
        temperature_c: round_half_up(sample.main.temp),
        humidity_pct: sample.main.humidity,
        condition: Condition {
            description: primary.description,
            icon: primary.icon,
        },
    })
}

/// Place-local offset from `city.timezone` (seconds east of UTC), UTC if absent.
fn utc_offset(raw: &RawForecast) -> FixedOffset {
    raw.0
        .pointer("/city/timezone")
        .and_then(serde_json::Value::as_i64)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
