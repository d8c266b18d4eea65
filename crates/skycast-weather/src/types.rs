use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use skycast_core::NetworkError;

/// Geographic location resolved for one lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name: the city for IP lookups, the user's query for searches
    pub name: String,
    /// ISO country code, when the resolving service reported one
    pub country_code: Option<String>,
    /// Full formatted address from the geocoder
    pub address: Option<String>,
}

impl Location {
    /// "City, CC" when the country is known, else just the name.
    pub fn label(&self) -> String {
        match self.country_code.as_deref() {
            Some(cc) if !cc.is_empty() => format!("{}, {}", self.name, cc),
            _ => self.name.clone(),
        }
    }
}

/// Current conditions, normalized from one API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherRecord {
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// hPa
    pub pressure: u32,
    pub visibility_km: f64,
    pub wind_speed: f64,
    /// Degrees, meteorological convention
    pub wind_direction: u16,
    pub description: String,
    pub icon: String,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    /// Cloud cover, percent
    pub clouds: u8,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

/// Forecast slots of one calendar day, summarized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    /// Slot closest to 12:00 local time
    pub representative: ForecastEntry,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Every slot that fell on `date`, in input order
    pub entries: Vec<ForecastEntry>,
}

/// Normalized forecast: the full slot series plus per-day tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Ungrouped series, used for the temperature trend
    pub entries: Vec<ForecastEntry>,
    /// At most five day summaries in first-seen order
    pub days: Vec<DailyForecastSummary>,
}

/// IP geolocation errors. Never reach the caller of `locate_current`.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location service unavailable: {0}")]
    ServiceUnavailable(#[from] NetworkError),
    #[error("Location service returned no position")]
    NoResult,
    #[error("Location parse error: {0}")]
    Parse(String),
}

/// How to obtain an OpenWeatherMap key, shown when none is configured.
pub const API_KEY_HELP: &str = "How to get an API key:
  1. Visit https://openweathermap.org/api
  2. Sign up for a free account
  3. Go to the API keys section
  4. Copy your API key
  5. Pass it with --api-key, set SKYCAST_API_KEY, or enter `key <your-api-key>`
Note: it may take a few minutes for new API keys to activate.";

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No API key configured")]
    MissingApiKey,
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Please enter your OpenWeatherMap API key to use the app.".to_string()
            }
            Self::LocationNotFound(query) if query.is_empty() => {
                "Please enter a city name to search.".to_string()
            }
            Self::LocationNotFound(query) => format!(
                "City '{}' not found. Please check the spelling and try again.",
                query
            ),
            Self::Network(e) => format!("Failed to fetch weather data. {}", e.user_message()),
            Self::MalformedResponse(_) => {
                "The weather service returned data we could not read.".to_string()
            }
        }
    }

    /// Extra guidance for errors the user can fix themselves.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::MissingApiKey => Some(API_KEY_HELP),
            _ => None,
        }
    }
}
