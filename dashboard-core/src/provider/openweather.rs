use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{Endpoint, WeatherFetchError},
    model::{Condition, CurrentConditions, PlaceQuery, RawForecast},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Fixed unit system; temperatures in °C, wind in m/s.
const UNITS: &str = "metric";

/// OpenWeatherMap client for the free `weather` and `forecast` endpoints.
///
/// The HTTP client has no timeout: a request the server never answers keeps
/// the refresh in the loading state.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
        place: &PlaceQuery,
    ) -> Result<String, WeatherFetchError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, %place, "Requesting OpenWeather {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", place.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .map_err(|e| WeatherFetchError::FetchFailed {
                endpoint,
                reason: format!("request failed: {e}"),
            })?;

        read_body(endpoint, place, res).await
    }
}

async fn read_body(
    endpoint: Endpoint,
    place: &PlaceQuery,
    res: Response,
) -> Result<String, WeatherFetchError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherFetchError::FetchFailed {
            endpoint,
            reason: format!("failed to read response body: {e}"),
        })?;

    if status.is_success() {
        return Ok(body);
    }

    debug!(%status, body = %truncate_body(&body), "OpenWeather {endpoint} request rejected");

    Err(match status {
        StatusCode::NOT_FOUND => WeatherFetchError::PlaceNotFound {
            endpoint,
            place: place.to_string(),
        },
        StatusCode::UNAUTHORIZED => WeatherFetchError::InvalidCredentials { endpoint },
        _ => WeatherFetchError::FetchFailed {
            endpoint,
            reason: format!("HTTP {status}: {}", truncate_body(&body)),
        },
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    visibility: Option<u32>,
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| Condition {
                description: w.description,
                icon: w.icon,
            })
            .unwrap_or_else(|| Condition {
                description: "Unknown".to_string(),
                icon: String::new(),
            });

        CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            visibility_m: parsed.visibility,
            condition,
            observation_time: DateTime::<Utc>::from_timestamp(parsed.dt, 0)
                .unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(place = %place))]
    async fn fetch_current(
        &self,
        place: &PlaceQuery,
    ) -> Result<CurrentConditions, WeatherFetchError> {
        let endpoint = Endpoint::Current;
        let body = self.get(endpoint, "weather", place).await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherFetchError::FetchFailed {
                endpoint,
                reason: format!("failed to parse current weather JSON: {e}"),
            })?;

        Ok(parsed.into())
    }

    #[instrument(skip(self), fields(place = %place))]
    async fn fetch_forecast_raw(
        &self,
        place: &PlaceQuery,
    ) -> Result<RawForecast, WeatherFetchError> {
        let endpoint = Endpoint::Forecast;
        let body = self.get(endpoint, "forecast", place).await?;

        let value = serde_json::from_str(&body).map_err(|e| WeatherFetchError::FetchFailed {
            endpoint,
            reason: format!("forecast body is not JSON: {e}"),
        })?;

        Ok(RawForecast(value))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
