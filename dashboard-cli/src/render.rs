//! Plain-text rendering of the dashboard view state.

use std::fmt::Write;

use dashboard_core::{
    CurrentConditions, ForecastDay, HistoryPoint, Phase, ViewState, WeatherIcon,
};

const BAR_WIDTH: usize = 30;

pub fn loading(place: &str) -> String {
    format!("Loading weather data for {place}...")
}

pub fn dashboard(state: &ViewState) -> String {
    let mut out = String::new();

    match state.phase {
        Phase::Idle => out.push_str("Enter a place name to load the dashboard.\n"),
        Phase::Loading => {
            let place = state
                .active_place
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            out.push_str(&loading(&place));
            out.push('\n');
        }
        Phase::Failed => {
            let message = state.last_error.as_deref().unwrap_or("Unknown error");
            let _ = writeln!(out, "Error: {message}");
        }
        Phase::Ready => {
            if let Some(current) = &state.current {
                current_card(&mut out, current);
            }
            temperature_trend(&mut out, &state.history);
            humidity_levels(&mut out, &state.history);
            forecast_strip(&mut out, &state.forecast);
        }
    }

    out
}

fn glyph(icon: WeatherIcon) -> &'static str {
    match icon {
        WeatherIcon::Sun => "☀",
        WeatherIcon::Cloud => "☁",
        WeatherIcon::CloudRain => "🌧",
    }
}

fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn current_card(out: &mut String, current: &CurrentConditions) {
    let _ = writeln!(
        out,
        "{}, {}  {} {}°C",
        current.location_name,
        current.country,
        glyph(current.condition.glyph()),
        current.rounded_temperature()
    );
    let _ = writeln!(out, "{}", capitalize(&current.condition.description));

    let visibility = current
        .visibility_km()
        .map_or_else(|| "n/a".to_string(), |km| format!("{km} km"));

    let _ = writeln!(
        out,
        "Feels like {}°C | Humidity {}% | Wind {} m/s | Visibility {}",
        current.rounded_feels_like(),
        current.humidity_pct,
        current.wind_speed_mps,
        visibility
    );
    out.push('\n');
}

fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled.max(1))
}

fn temperature_trend(out: &mut String, history: &[HistoryPoint]) {
    if history.is_empty() {
        return;
    }

    let synthetic = history.iter().any(|p| p.synthetic);
    let _ = writeln!(
        out,
        "7-Day Temperature Trend{}",
        if synthetic { " (simulated)" } else { "" }
    );

    let min = history.iter().map(|p| p.temperature_c).fold(f64::INFINITY, f64::min);
    let max = history.iter().map(|p| p.temperature_c).fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);

    for point in history {
        let _ = writeln!(
            out,
            "  {:<7}{:>6.1}°C {}",
            point.label,
            point.temperature_c,
            bar((point.temperature_c - min) / span)
        );
    }
    out.push('\n');
}

fn humidity_levels(out: &mut String, history: &[HistoryPoint]) {
    if history.is_empty() {
        return;
    }

    out.push_str("7-Day Humidity Levels\n");
    for point in history {
        let _ = writeln!(
            out,
            "  {:<7}{:>4}% {}",
            point.label,
            point.humidity_pct,
            bar(f64::from(point.humidity_pct) / 100.0)
        );
    }
    out.push('\n');
}

fn forecast_strip(out: &mut String, forecast: &[ForecastDay]) {
    if forecast.is_empty() {
        return;
    }

    out.push_str("5-Day Forecast\n");
    for day in forecast {
        let _ = writeln!(
            out,
            "  {:<4}{} {:>4}°C  {:<20} {}% humidity",
            day.label,
            glyph(day.condition.glyph()),
            day.temperature_c,
            capitalize(&day.condition.description),
            day.humidity_pct
        );
    }
}
