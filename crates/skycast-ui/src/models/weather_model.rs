//! Result of one lookup action, ready for rendering or JSON output.

use serde::Serialize;
use skycast_core::Units;
use skycast_weather::{CurrentWeatherRecord, Forecast, Location};

/// Everything one action produced.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    /// Heading for the current-conditions block
    pub title: String,
    pub location: Location,
    /// Label shown on the map pin
    pub map_label: String,
    pub current: CurrentWeatherRecord,
    /// `None` when the forecast was not requested or failed
    pub forecast: Option<Forecast>,
    /// Non-fatal problems (e.g. forecast fetch failed after current succeeded)
    pub warnings: Vec<String>,
    pub units: Units,
}

impl WeatherReport {
    /// Current temperature as displayed: rounded, ties to even.
    pub fn display_temperature(&self) -> i64 {
        round_display(self.current.temperature)
    }

    pub fn display_feels_like(&self) -> i64 {
        round_display(self.current.feels_like)
    }

    /// "City, CC" from the weather record itself.
    pub fn station_label(&self) -> String {
        match self.current.country.as_deref() {
            Some(cc) if !cc.is_empty() => format!("{}, {}", self.current.city, cc),
            _ => self.current.city.clone(),
        }
    }
}

/// Round a reading for display. Ties go to the even neighbour.
pub fn round_display(value: f64) -> i64 {
    value.round_ties_even() as i64
}
