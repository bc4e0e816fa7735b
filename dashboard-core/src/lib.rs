//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The OpenWeatherMap client (current conditions, raw 5-day forecast)
//! - Forecast downsampling and synthetic trailing-week history
//! - The dashboard controller and its published view state
//! - Configuration & credentials handling
//!
//! Rendering is left to the caller; `dashboard-cli` is one such front-end.

pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod history;
pub mod icon;
pub mod model;
pub mod provider;

pub use config::Config;
pub use controller::{Dashboard, Phase, RefreshOutcome, ViewState};
pub use error::{EmptyPlaceQuery, Endpoint, MalformedForecastError, RefreshError, WeatherFetchError};
pub use forecast::normalize_forecast;
pub use history::{HistoryProvider, SyntheticHistory};
pub use icon::WeatherIcon;
pub use model::{
    Condition, CurrentConditions, ForecastDay, HistoryPoint, PlaceQuery, RawForecast,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
