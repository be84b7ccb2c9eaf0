use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fmt;

use crate::WeatherError;

/// Snapshot of one city's weather as reported by the API.
///
/// A record is only ever built fully populated; there is no way to change it
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    city: String,
    observed_at: i64,
    temperature_c: f64,
    wind_speed_mps: f64,
}

impl WeatherRecord {
    /// Build a record, rejecting an empty city name or non-finite measurements.
    pub fn new(
        city: impl Into<String>,
        observed_at: i64,
        temperature_c: f64,
        wind_speed_mps: f64,
    ) -> Result<Self, WeatherError> {
        let city = city.into();
        if city.trim().is_empty() {
            return Err(WeatherError::Parse("city name is empty".into()));
        }
        if !temperature_c.is_finite() {
            let reason = format!("temperature is not a number: {temperature_c}");
            return Err(WeatherError::Parse(reason));
        }
        if !wind_speed_mps.is_finite() {
            let reason = format!("wind speed is not a number: {wind_speed_mps}");
            return Err(WeatherError::Parse(reason));
        }

        Ok(Self {
            city,
            observed_at,
            temperature_c,
            wind_speed_mps,
        })
    }

    /// Parse the body of an OpenWeather "current weather" response.
    pub fn from_api_json(body: &str) -> Result<Self, WeatherError> {
        let parsed: OwCurrentResponse = serde_json::from_str(body)?;
        Self::new(parsed.name, parsed.dt, parsed.main.temp, parsed.wind.speed)
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Unix seconds at which the API took the measurement.
    pub fn observed_at(&self) -> i64 {
        self.observed_at
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    pub fn wind_speed_mps(&self) -> f64 {
        self.wind_speed_mps
    }

    /// Measurement time in the local timezone, if the timestamp is representable.
    pub fn observed_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.observed_at, 0).map(|utc| utc.with_timezone(&Local))
    }
}

impl fmt::Display for WeatherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.observed_at_local() {
            Some(at) => writeln!(f, "Weather fetched at : {}", at.format("%Y-%m-%d %H:%M:%S %:z"))?,
            None => writeln!(f, "Weather fetched at : {} (unix)", self.observed_at)?,
        }
        writeln!(f, "Weather for city : {}", self.city)?;
        // `{:?}` keeps a decimal on whole values: 15.0, not 15
        writeln!(f, "\tCurrent temperature : {:?}°C", self.temperature_c)?;
        writeln!(f, "\tWind speed : {:?} m/s", self.wind_speed_mps)
    }
}

/// Render records one after the other, in the order given.
pub fn render_listing(records: &[WeatherRecord]) -> String {
    records.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    wind: OwWind,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LYON: &str = r#"{
        "coord": {"lon": 4.85, "lat": 45.75},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
        "main": {"temp": 12.5, "feels_like": 11.9, "humidity": 71},
        "wind": {"speed": 3.2, "deg": 180},
        "dt": 1700000000,
        "name": "Lyon",
        "cod": 200
    }"#;

    #[test]
    fn parses_current_weather_payload() {
        let record = WeatherRecord::from_api_json(LYON).expect("payload is complete");

        assert_eq!(record.city(), "Lyon");
        assert_eq!(record.observed_at(), 1_700_000_000);
        assert_eq!(record.temperature_c(), 12.5);
        assert_eq!(record.wind_speed_mps(), 3.2);
    }

    #[test]
    fn missing_wind_is_a_parse_error() {
        let body = r#"{"name": "Lyon", "dt": 1700000000, "main": {"temp": 12.5}}"#;
        let err = WeatherRecord::from_api_json(body).unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn non_numeric_temperature_is_a_parse_error() {
        let body = r#"{
            "name": "Lyon", "dt": 1700000000, "main": {"temp": "mild"}, "wind": {"speed": 3.2}
        }"#;
        let err = WeatherRecord::from_api_json(body).unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn empty_city_is_rejected() {
        let err = WeatherRecord::new("  ", 0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn non_finite_measurement_is_rejected() {
        assert!(WeatherRecord::new("Lyon", 0, f64::NAN, 1.0).is_err());
        assert!(WeatherRecord::new("Lyon", 0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn display_shows_city_and_units() {
        let record = WeatherRecord::new("Lyon", 1_700_000_000, 12.5, 3.2).unwrap();
        let text = record.to_string();

        assert!(text.starts_with("Weather fetched at : "));
        assert!(text.contains("Weather for city : Lyon\n"));
        assert!(text.contains("\tCurrent temperature : 12.5°C\n"));
        assert!(text.contains("\tWind speed : 3.2 m/s\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn display_keeps_a_decimal_on_whole_values() {
        let record = WeatherRecord::new("Paris", 1_700_000_000, 15.0, 4.0).unwrap();
        let text = record.to_string();

        assert!(text.contains("\tCurrent temperature : 15.0°C\n"));
        assert!(text.contains("\tWind speed : 4.0 m/s\n"));
    }

    #[test]
    fn listing_concatenates_in_order() {
        let lyon = WeatherRecord::new("Lyon", 1_700_000_000, 12.5, 3.2).unwrap();
        let nice = WeatherRecord::new("Nice", 1_700_000_000, 18.0, 1.1).unwrap();

        let listing = render_listing(&[lyon.clone(), nice.clone()]);

        assert_eq!(listing, format!("{lyon}{nice}"));
        assert!(listing.find("Lyon").unwrap() < listing.find("Nice").unwrap());
    }
}
