use serde::{Deserialize, Serialize};

/// Glyph family shown for a provider icon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sun,
    Cloud,
    CloudRain,
}

impl WeatherIcon {
    /// Maps an OpenWeatherMap icon code (`"01d"`, `"10n"`, ...) to a glyph.
    /// Unknown codes fall back to [`WeatherIcon::Cloud`].
    pub fn from_code(code: &str) -> Self {
        match code.get(..2) {
            Some("01") if is_known_variant(code) => WeatherIcon::Sun,
            Some("09" | "10" | "11") if is_known_variant(code) => WeatherIcon::CloudRain,
            _ => WeatherIcon::Cloud,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "sun",
            WeatherIcon::Cloud => "cloud",
            WeatherIcon::CloudRain => "cloud_rain",
        }
    }
}

/// Night codes end in `n`; the presentation layer uses this for a dimmer tint.
pub fn is_night(code: &str) -> bool {
    is_known_variant(code) && code.ends_with('n')
}

fn is_known_variant(code: &str) -> bool {
    code.len() == 3 && (code.ends_with('d') || code.ends_with('n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky_is_sun() {
        assert_eq!(WeatherIcon::from_code("01d"), WeatherIcon::Sun);
        assert_eq!(WeatherIcon::from_code("01n"), WeatherIcon::Sun);
    }

    #[test]
    fn precipitation_codes_are_rain() {
        for code in ["09d", "09n", "10d", "10n", "11d", "11n"] {
            assert_eq!(WeatherIcon::from_code(code), WeatherIcon::CloudRain, "{code}");
        }
    }

    #[test]
    fn clouds_snow_mist_and_unknown_are_cloud() {
        for code in ["02d", "03n", "04d", "13d", "50n", "", "zz", "01x", "010d"] {
            assert_eq!(WeatherIcon::from_code(code), WeatherIcon::Cloud, "{code}");
        }
    }

    #[test]
    fn night_variant() {
        assert!(is_night("01n"));
        assert!(!is_night("01d"));
        assert!(!is_night("n"));
    }
}
