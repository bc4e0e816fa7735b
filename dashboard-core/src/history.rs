//! Trailing-week series shown next to the forecast.
//!
//! The provider's historical endpoint needs a paid plan, so the only
//! implementation here fabricates the series from the current temperature.
//! A real historical source should implement [`HistoryProvider`] and replace
//! [`SyntheticHistory`] rather than imitate its randomness.

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{fmt::Debug, ops::RangeInclusive};

use crate::{
    error::RefreshError,
    model::{CurrentConditions, HistoryPoint, round_one_decimal},
};

pub const HISTORY_DAYS: u64 = 7;

/// Maximum distance of a generated temperature from the current one.
pub const TEMPERATURE_JITTER: f64 = 4.0;
pub const HUMIDITY_RANGE: RangeInclusive<u8> = 40..=90;
pub const PRESSURE_RANGE: RangeInclusive<u16> = 980..=1040;

// Rounding to one decimal moves a value by at most half a step.
const ROUNDING_SLACK: f64 = 0.05;

/// Source of the trailing-week series for a place.
#[async_trait]
pub trait HistoryProvider: Send + Sync + Debug {
    async fn history(&self, current: &CurrentConditions)
    -> Result<Vec<HistoryPoint>, RefreshError>;
}

/// Jitters the current temperature into a seven-day series.
///
/// Output is intentionally non-deterministic unless a seeded generator is
/// injected with [`SyntheticHistory::with_rng`].
#[derive(Debug)]
pub struct SyntheticHistory<R = StdRng> {
    rng: Mutex<R>,
}

impl SyntheticHistory<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for SyntheticHistory<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SyntheticHistory<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    pub fn generate(&self, current_temp: f64, today: NaiveDate) -> Vec<HistoryPoint> {
        generate_history(&mut *self.rng.lock(), current_temp, today)
    }
}

#[async_trait]
impl<R> HistoryProvider for SyntheticHistory<R>
where
    R: Rng + Send + Debug,
{
    async fn history(
        &self,
        current: &CurrentConditions,
    ) -> Result<Vec<HistoryPoint>, RefreshError> {
        Ok(self.generate(current.temperature_c, Local::now().date_naive()))
    }
}

/// Builds the points for the six days before `today` and `today` itself,
/// oldest first.
pub fn generate_history<R: Rng + ?Sized>(
    rng: &mut R,
    current_temp: f64,
    today: NaiveDate,
) -> Vec<HistoryPoint> {
    let spread = TEMPERATURE_JITTER - ROUNDING_SLACK;

    (0..HISTORY_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
            let noise = rng.random_range(-spread..=spread);

            HistoryPoint {
                label: date.format("%b %-d").to_string(),
                date,
                temperature_c: round_one_decimal(current_temp + noise),
                humidity_pct: rng.random_range(HUMIDITY_RANGE),
                pressure_hpa: rng.random_range(PRESSURE_RANGE),
                synthetic: true,
            }
        })
        .collect()
}
