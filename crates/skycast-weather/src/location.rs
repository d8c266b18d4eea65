//! Current location via IP geolocation.
//!
//! Lookup failures are never surfaced: the configured fallback location is
//! returned instead and the failure is logged.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use skycast_core::{FallbackLocation, LocationConfig, NetworkError, ReqwestErrorExt};
use std::time::Duration;

use crate::types::{Location, LocationError, WeatherError};

/// Resolves the caller's approximate location.
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate_current(&self) -> Location;
}

/// ipinfo-style response: `{"city": "..", "country": "US", "loc": "lat,lon"}`
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    loc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IpInfoLocator {
    client: Client,
    url: String,
    fallback: FallbackLocation,
}

impl IpInfoLocator {
    pub fn new(config: &LocationConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            url: config.ip_lookup_url.clone(),
            fallback: config.fallback.clone(),
        })
    }

    async fn lookup(&self) -> Result<Location, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: "IP lookup failed".to_string(),
            }
            .into());
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Parse(e.to_string()))?;

        let loc = body.loc.filter(|l| !l.trim().is_empty()).ok_or(LocationError::NoResult)?;
        let (latitude, longitude) = parse_lat_lon(&loc)?;

        let name = body
            .city
            .or(body.region)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Current location".to_string());

        Ok(Location {
            latitude,
            longitude,
            name,
            country_code: body.country.filter(|c| !c.is_empty()),
            address: None,
        })
    }
}

#[async_trait]
impl IpLocator for IpInfoLocator {
    async fn locate_current(&self) -> Location {
        match self.lookup().await {
            Ok(location) => {
                tracing::info!(
                    "Located via IP: {} ({:.4}, {:.4})",
                    location.label(),
                    location.latitude,
                    location.longitude
                );
                location
            }
            Err(e) => {
                tracing::warn!("IP geolocation failed, using fallback location: {}", e);
                fallback_location(&self.fallback)
            }
        }
    }
}

pub fn fallback_location(fallback: &FallbackLocation) -> Location {
    Location {
        latitude: fallback.latitude,
        longitude: fallback.longitude,
        name: fallback.name.clone(),
        country_code: Some(fallback.country.clone()),
        address: None,
    }
}

fn parse_lat_lon(loc: &str) -> Result<(f64, f64), LocationError> {
    let (lat, lon) = loc
        .split_once(',')
        .ok_or_else(|| LocationError::Parse(format!("expected 'lat,lon', got '{}'", loc)))?;

    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| LocationError::Parse(format!("latitude '{}': {}", lat, e)))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| LocationError::Parse(format!("longitude '{}': {}", lon, e)))?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(LocationError::Parse(format!("coordinates out of range: {}", loc)));
    }

    Ok((latitude, longitude))
}
