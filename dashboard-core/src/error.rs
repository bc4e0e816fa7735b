use std::fmt;

use thiserror::Error;

/// Which provider endpoint a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one of the two provider calls.
///
/// The `Display` text is what the dashboard shows to the user, so it stays
/// free of status codes and response bodies.
#[derive(Debug, Error)]
pub enum WeatherFetchError {
    #[error("{}", not_found_message(.endpoint))]
    PlaceNotFound { endpoint: Endpoint, place: String },

    #[error("{}", invalid_credentials_message(.endpoint))]
    InvalidCredentials { endpoint: Endpoint },

    #[error("{}", fetch_failed_message(.endpoint))]
    FetchFailed { endpoint: Endpoint, reason: String },
}

impl WeatherFetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            WeatherFetchError::PlaceNotFound { endpoint, .. }
            | WeatherFetchError::InvalidCredentials { endpoint }
            | WeatherFetchError::FetchFailed { endpoint, .. } => *endpoint,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherFetchError::PlaceNotFound { .. })
    }

    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, WeatherFetchError::InvalidCredentials { .. })
    }
}

fn not_found_message(endpoint: &Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Current => "City not found. Please check the spelling and try again.",
        Endpoint::Forecast => "Forecast data not available for this city.",
    }
}

fn invalid_credentials_message(endpoint: &Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Current => "Invalid API key. Please check your OpenWeatherMap API key.",
        Endpoint::Forecast => "Invalid API key for forecast data.",
    }
}

fn fetch_failed_message(endpoint: &Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Current => "Failed to fetch weather data. Please try again.",
        Endpoint::Forecast => "Failed to fetch forecast data.",
    }
}

/// The forecast payload did not have the shape the normalizer expects.
#[derive(Debug, Error)]
pub enum MalformedForecastError {
    #[error("Forecast data is malformed: the sample list is missing")]
    MissingList,

    #[error("Forecast data is malformed: no samples in the forecast")]
    NoSamples,

    #[error("Forecast data is malformed: sample {index} is invalid ({reason})")]
    InvalidSample { index: usize, reason: String },
}

/// Anything that can end a refresh cycle in the failed state.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] WeatherFetchError),

    #[error(transparent)]
    MalformedForecast(#[from] MalformedForecastError),
}

/// A place query that is empty once surrounding whitespace is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Place name must not be empty")]
pub struct EmptyPlaceQuery;
