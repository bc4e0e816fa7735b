use crate::{
    Config, CurrentConditions, PlaceQuery, RawForecast, error::WeatherFetchError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two calls one refresh cycle makes against the weather service.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, place: &PlaceQuery)
    -> Result<CurrentConditions, WeatherFetchError>;

    /// 5-day / 3-hour forecast, left uninterpreted.
    async fn fetch_forecast_raw(&self, place: &PlaceQuery)
    -> Result<RawForecast, WeatherFetchError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `weather-dashboard configure` and enter your OpenWeatherMap API key."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.base_url.clone(),
    )))
}
