//! Per-session state: API key, display toggles and the last successful lookup.
//!
//! A session lives in memory only. It is created when the CLI starts and
//! cleared when it exits.

use skycast_core::{ApiKey, DisplayConfig};
use skycast_weather::WeatherError;

use crate::models::WeatherReport;

/// How the user picks a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    #[default]
    CurrentLocation,
    SearchCity,
}

impl LocationMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::CurrentLocation => "Use Current Location",
            Self::SearchCity => "Search City",
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    api_key: Option<ApiKey>,
    pub show_forecast: bool,
    pub show_map: bool,
    pub mode: LocationMode,
    last_lookup: Option<WeatherReport>,
}

impl Session {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            api_key: None,
            show_forecast: display.show_forecast,
            show_map: display.show_map,
            mode: LocationMode::default(),
            last_lookup: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<ApiKey>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Store a user-supplied key. Returns false (and keeps the old key) if blank.
    pub fn set_api_key(&mut self, raw: &str) -> bool {
        match ApiKey::new(raw) {
            Some(key) => {
                self.api_key = Some(key);
                tracing::info!("API key configured for this session");
                true
            }
            None => false,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The key every lookup needs; `MissingApiKey` blocks the action.
    pub fn api_key(&self) -> Result<&ApiKey, WeatherError> {
        self.api_key.as_ref().ok_or(WeatherError::MissingApiKey)
    }

    pub fn record_lookup(&mut self, report: WeatherReport) {
        self.last_lookup = Some(report);
    }

    pub fn last_lookup(&self) -> Option<&WeatherReport> {
        self.last_lookup.as_ref()
    }

    /// One-line summary of the session settings.
    pub fn summary(&self) -> String {
        format!(
            "Mode: {} | API key: {} | Forecast: {} | Map: {}",
            self.mode.label(),
            if self.has_api_key() { "set" } else { "missing" },
            on_off(self.show_forecast),
            on_off(self.show_map),
        )
    }

    /// Forget the key and the last lookup.
    pub fn clear(&mut self) {
        self.api_key = None;
        self.last_lookup = None;
        tracing::debug!("Session cleared");
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
