//! Integration tests for the OpenWeatherMap client and a full refresh cycle
//! against a wiremock server.

use std::sync::Arc;

use dashboard_core::{
    Dashboard, Endpoint, OpenWeatherProvider, Phase, PlaceQuery, RefreshOutcome,
    SyntheticHistory, WeatherFetchError, WeatherIcon, WeatherProvider, normalize_forecast,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "test-key";

fn current_response(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "base": "stations",
        "main": {
            "temp": temp,
            "feels_like": temp - 0.8,
            "temp_min": temp - 1.0,
            "temp_max": temp + 1.0,
            "pressure": 1015,
            "humidity": 60
        },
        "visibility": 10000,
        "wind": { "speed": 4.12, "deg": 250 },
        "clouds": { "all": 0 },
        "dt": 1_705_320_000,
        "sys": { "country": "GB", "sunrise": 1_705_305_000, "sunset": 1_705_335_000 },
        "timezone": 0,
        "id": 2_643_743,
        "name": name,
        "cod": 200
    })
}

fn forecast_response(temp: f64) -> serde_json::Value {
    // 2024-01-15 00:00 UTC (Monday), 40 samples three hours apart.
    let list: Vec<_> = (0..40_i32)
        .map(|i| {
            serde_json::json!({
                "dt": 1_705_276_800 + i * 10_800,
                "main": { "temp": temp + f64::from(i) * 0.1, "humidity": 65, "pressure": 1012 },
                "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
                "dt_txt": "2024-01-15 00:00:00"
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "cnt": 40,
        "list": list,
        "city": { "name": "London", "country": "GB", "timezone": 0 }
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url(API_KEY.to_string(), server.uri())
}

fn place(name: &str) -> PlaceQuery {
    PlaceQuery::try_from(name).expect("non-empty place")
}

async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(server)
        .await;
}

fn dashboard(server: &MockServer) -> Dashboard {
    Dashboard::new(
        Arc::new(provider(server)),
        Arc::new(SyntheticHistory::new()),
    )
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn fetch_current_sends_query_and_parses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response("London", 15.0)))
        .expect(1)
        .mount(&server)
        .await;

    let current = provider(&server)
        .fetch_current(&place("London"))
        .await
        .expect("current conditions");

    assert_eq!(current.location_name, "London");
    assert_eq!(current.country, "GB");
    assert!((current.temperature_c - 15.0).abs() < f64::EPSILON);
    assert_eq!(current.humidity_pct, 60);
    assert_eq!(current.visibility_km(), Some(10));
    assert_eq!(current.condition.glyph(), WeatherIcon::Sun);
}

#[tokio::test]
async fn fetch_forecast_raw_is_normalized_to_five_days() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_response(7.0)),
    )
    .await;

    let raw = provider(&server)
        .fetch_forecast_raw(&place("London"))
        .await
        .expect("raw forecast");
    let days = normalize_forecast(&raw).expect("well-formed forecast");

    assert_eq!(days.len(), 5);
    assert_eq!(days[0].label, "Mon");
    assert_eq!(days[4].label, "Fri");
    // Samples 0, 8, 16, 24, 32 → 7.0, 7.8, 8.6, 9.4, 10.2
    let temps: Vec<_> = days.iter().map(|d| d.temperature_c).collect();
    assert_eq!(temps, [7, 8, 9, 9, 10]);
    assert!(days.iter().all(|d| d.condition.glyph() == WeatherIcon::CloudRain));
}

#[tokio::test]
async fn not_found_maps_to_place_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/weather",
        ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })),
    )
    .await;

    let err = provider(&server)
        .fetch_current(&place("Nowhere123"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.endpoint(), Endpoint::Current);
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn unauthorized_maps_to_invalid_credentials() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/forecast",
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })),
    )
    .await;

    let err = provider(&server)
        .fetch_forecast_raw(&place("London"))
        .await
        .unwrap_err();

    assert!(err.is_invalid_credentials());
    assert_eq!(err.endpoint(), Endpoint::Forecast);
}

#[tokio::test]
async fn server_error_maps_to_fetch_failed() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(503).set_body_string("busy")).await;

    let err = provider(&server)
        .fetch_current(&place("London"))
        .await
        .unwrap_err();

    match &err {
        WeatherFetchError::FetchFailed { reason, .. } => assert!(reason.contains("503")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("Failed to fetch weather data"));
}

#[tokio::test]
async fn invalid_json_maps_to_fetch_failed() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_string("<html>")).await;

    let err = provider(&server)
        .fetch_current(&place("London"))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherFetchError::FetchFailed { endpoint: Endpoint::Current, .. }));
}

#[tokio::test]
async fn connection_refused_maps_to_fetch_failed() {
    // Nothing listens on port 1.
    let err = OpenWeatherProvider::with_base_url(API_KEY.to_string(), "http://127.0.0.1:1".into())
        .fetch_forecast_raw(&place("London"))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherFetchError::FetchFailed { endpoint: Endpoint::Forecast, .. }));
}

// ============================================================================
// Refresh cycle
// ============================================================================

#[tokio::test]
async fn london_refresh_ends_ready() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/weather",
        ResponseTemplate::new(200).set_body_json(current_response("London", 15.0)),
    )
    .await;
    mount(
        &server,
        "/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_response(15.0)),
    )
    .await;

    let dash = dashboard(&server);
    let outcome = dash.refresh(place("London")).await;
    assert_eq!(outcome, RefreshOutcome::Applied(Phase::Ready));

    let state = dash.snapshot();
    let current = state.current.as_ref().expect("current conditions");
    assert_eq!(current.rounded_temperature(), 15);
    assert_eq!(current.condition.glyph(), WeatherIcon::Sun);
    assert_eq!(state.forecast.len(), 5);
    assert_eq!(state.history.len(), 7);
    assert!(state.history.iter().all(|p| (11.0..=19.0).contains(&p.temperature_c)));
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn not_found_refresh_ends_failed_and_empty() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(404)).await;
    mount(
        &server,
        "/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_response(3.0)),
    )
    .await;

    let dash = dashboard(&server);
    let outcome = dash.refresh(place("Nowhere123")).await;
    assert_eq!(outcome, RefreshOutcome::Applied(Phase::Failed));

    let state = dash.snapshot();
    assert!(state.current.is_none());
    assert!(state.forecast.is_empty());
    assert!(state.history.is_empty());
    assert!(state.last_error.as_deref().unwrap_or_default().contains("not found"));
}

#[tokio::test]
async fn both_endpoints_are_requested_once_per_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response("Oslo", -3.0)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response(-3.0)))
        .expect(2)
        .mount(&server)
        .await;

    let dash = dashboard(&server);
    dash.refresh(place("Oslo")).await;
    let first = dash.snapshot();
    dash.refresh(place("Oslo")).await;
    let second = dash.snapshot();

    assert_eq!(first.current, second.current);
    assert_eq!(first.forecast, second.forecast);
    assert!(
        second
            .history
            .iter()
            .all(|p| (-7.0..=1.0).contains(&p.temperature_c))
    );
}
