//! Shared services used by every lookup action.
//!
//! Holds the geocoder, IP locator and weather source behind trait objects so
//! actions can run against the real services or test doubles.

use std::sync::Arc;

use skycast_core::{Config, Units};
use skycast_weather::{
    Geocoder, IpInfoLocator, IpLocator, NominatimGeocoder, WeatherError, WeatherProvider,
    WeatherSource,
};

/// Per-lookup request settings taken from the weather config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSettings {
    pub forecast_days: u32,
    /// Unit system requested from the weather source and used for labels
    pub units: Units,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            forecast_days: skycast_core::config::MAX_FORECAST_DAYS,
            units: Units::Metric,
        }
    }
}

pub struct AppServices {
    geocoder: Arc<dyn Geocoder>,
    locator: Arc<dyn IpLocator>,
    weather: Arc<dyn WeatherSource>,
    settings: LookupSettings,
}

impl AppServices {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        locator: Arc<dyn IpLocator>,
        weather: Arc<dyn WeatherSource>,
        settings: LookupSettings,
    ) -> Self {
        Self {
            geocoder,
            locator,
            weather,
            settings,
        }
    }

    /// Build the production services from configuration.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let geocoder = NominatimGeocoder::new(&config.geocoding)?;
        let locator = IpInfoLocator::new(&config.location)?;
        let weather = WeatherProvider::new(&config.weather)?;

        tracing::debug!(
            "Services ready: weather={}, geocoding={}",
            config.weather.base_url,
            config.geocoding.nominatim_url
        );

        Ok(Self::new(
            Arc::new(geocoder),
            Arc::new(locator),
            Arc::new(weather),
            LookupSettings {
                forecast_days: config.weather.forecast_days,
                units: config.weather.units,
            },
        ))
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.geocoder.as_ref()
    }

    pub fn locator(&self) -> &dyn IpLocator {
        self.locator.as_ref()
    }

    pub fn weather(&self) -> &dyn WeatherSource {
        self.weather.as_ref()
    }

    pub fn settings(&self) -> LookupSettings {
        self.settings
    }
}
