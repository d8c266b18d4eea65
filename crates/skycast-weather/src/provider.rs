//! OpenWeatherMap client: current conditions and the 5-day/3-hour forecast.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use skycast_core::{ApiKey, NetworkError, ReqwestErrorExt, Units, WeatherConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::WeatherError;

/// Forecast slots per day at the API's 3-hour cadence.
pub const SLOTS_PER_DAY: u32 = 8;

/// Source of raw weather JSON.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(
        &self,
        api_key: &ApiKey,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<Value, WeatherError>;

    /// Requests `days * 8` slots.
    async fn fetch_forecast(
        &self,
        api_key: &ApiKey,
        latitude: f64,
        longitude: f64,
        units: Units,
        days: u32,
    ) -> Result<Value, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} returned status {}", endpoint, status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: api_message(&body),
            }
            .into());
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WeatherError::MalformedResponse(format!("{}: invalid JSON: {}", endpoint, e)))
    }

    fn base_params(
        api_key: &ApiKey,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", api_key.expose().to_string()),
            ("units", units.as_query().to_string()),
        ]
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    #[instrument(skip(self, api_key), level = "debug")]
    async fn fetch_current(
        &self,
        api_key: &ApiKey,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<Value, WeatherError> {
        let params = Self::base_params(api_key, latitude, longitude, units);
        self.get_json("weather", &params).await
    }

    #[instrument(skip(self, api_key), level = "debug")]
    async fn fetch_forecast(
        &self,
        api_key: &ApiKey,
        latitude: f64,
        longitude: f64,
        units: Units,
        days: u32,
    ) -> Result<Value, WeatherError> {
        let mut params = Self::base_params(api_key, latitude, longitude, units);
        params.push(("cnt", (days * SLOTS_PER_DAY).to_string()));
        self.get_json("forecast", &params).await
    }
}

/// Pull `message` out of an OpenWeatherMap error body, else return the body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
