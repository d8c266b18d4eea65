//! Forward geocoding: convert a free-text place name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use skycast_core::{GeocodingConfig, ReqwestErrorExt};
use std::time::Duration;

use crate::types::{Location, WeatherError};

/// Resolves a free-text query to a location.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `LocationNotFound` when nothing matches or the service fails.
    async fn locate_by_name(&self, query: &str) -> Result<Location, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country_code: Option<String>,
}

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
        })
    }

    async fn search(&self, query: &str) -> Option<Location> {
        let url = format!("{}/search", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Geocode returned status {}", response.status());
            return None;
        }

        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Geocode parse error: {}", e);
                return None;
            }
        };

        let place = places.into_iter().next()?;

        let (latitude, longitude) = match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => {
                tracing::warn!("Geocode returned unparsable coordinates: {}, {}", place.lat, place.lon);
                return None;
            }
        };

        let country_code = place
            .address
            .and_then(|a| a.country_code)
            .map(|cc| cc.to_uppercase());

        Some(Location {
            latitude,
            longitude,
            name: query.to_string(),
            country_code,
            address: place.display_name,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate_by_name(&self, query: &str) -> Result<Location, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::LocationNotFound(String::new()));
        }

        match self.search(query).await {
            Some(location) => {
                tracing::info!(
                    "Geocoded '{}' to {:.4}, {:.4}",
                    query,
                    location.latitude,
                    location.longitude
                );
                Ok(location)
            }
            None => Err(WeatherError::LocationNotFound(query.to_string())),
        }
    }
}
