//! Weather service for Skycast
//!
//! Resolves locations (IP geolocation or Nominatim search), fetches
//! OpenWeatherMap current conditions and forecasts, and normalizes the raw
//! JSON into day-grouped records.

pub mod geocode;
pub mod location;
pub mod normalize;
pub mod provider;
pub mod types;

pub use geocode::{Geocoder, NominatimGeocoder};
pub use location::{fallback_location, IpInfoLocator, IpLocator};
pub use normalize::{
    forecast_entries, group_entries, group_forecast, normalize_current, FORECAST_TILE_DAYS,
};
pub use provider::{WeatherProvider, WeatherSource};
pub use types::*;
