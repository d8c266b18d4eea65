//! Lookup actions: one entry point per user action.
//!
//! Each action runs Geolocator -> current fetch -> normalize, then optionally
//! forecast fetch -> group. The forecast is only requested after the current
//! conditions succeeded.

use skycast_core::ApiKey;
use skycast_weather::{group_forecast, normalize_current, Forecast, Location, WeatherError};

use crate::app_services::AppServices;
use crate::models::WeatherReport;
use crate::session::{LocationMode, Session};

/// Cities offered by the quick weather check.
pub const QUICK_CITIES: [&str; 10] = [
    "London",
    "Paris",
    "Tokyo",
    "New York",
    "Sydney",
    "Dubai",
    "Singapore",
    "Mumbai",
    "São Paulo",
    "Cairo",
];

/// Weather for the caller's IP-derived location.
///
/// Location lookup never fails; an unreachable service yields the fallback city.
pub async fn lookup_current_location(
    services: &AppServices,
    session: &mut Session,
) -> Result<WeatherReport, WeatherError> {
    session.mode = LocationMode::CurrentLocation;
    let api_key = session.api_key()?.clone();

    let location = services.locator().locate_current().await;
    let map_label = location.label();

    let report = fetch_report(
        services,
        &api_key,
        location,
        "Your Current Location".to_string(),
        map_label,
        session.show_forecast,
    )
    .await?;

    session.record_lookup(report.clone());
    Ok(report)
}

/// Weather for a free-text city query.
///
/// An unknown city aborts before any weather request is made.
pub async fn search_city(
    services: &AppServices,
    session: &mut Session,
    query: &str,
) -> Result<WeatherReport, WeatherError> {
    session.mode = LocationMode::SearchCity;
    let api_key = session.api_key()?.clone();

    let query = query.trim();
    if query.is_empty() {
        return Err(WeatherError::LocationNotFound(String::new()));
    }

    let location = services.geocoder().locate_by_name(query).await?;

    let mut report = fetch_report(
        services,
        &api_key,
        location,
        format!("Weather in {}", query),
        String::new(),
        session.show_forecast,
    )
    .await?;
    report.map_label = report.current.city.clone();

    session.record_lookup(report.clone());
    Ok(report)
}

/// Per-city outcomes of one quick check
#[derive(Debug, Default)]
pub struct QuickCheck {
    pub results: Vec<(String, Result<WeatherReport, WeatherError>)>,
}

impl QuickCheck {
    /// True when at least one city produced a report.
    pub fn any_succeeded(&self) -> bool {
        self.results.iter().any(|(_, outcome)| outcome.is_ok())
    }
}

/// Current conditions for each of the `QUICK_CITIES`, in order.
///
/// Failures are reported per city; the session's last lookup is left alone.
pub async fn quick_check(
    services: &AppServices,
    session: &Session,
) -> Result<QuickCheck, WeatherError> {
    let api_key = session.api_key()?.clone();
    let mut results = Vec::with_capacity(QUICK_CITIES.len());

    for city in QUICK_CITIES {
        let outcome = match services.geocoder().locate_by_name(city).await {
            Ok(location) => {
                let map_label = city.to_string();
                fetch_report(
                    services,
                    &api_key,
                    location,
                    format!("Weather in {}", city),
                    map_label,
                    false,
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::warn!("Quick check for {} failed: {}", city, e);
        }
        results.push((city.to_string(), outcome));
    }

    Ok(QuickCheck { results })
}

async fn fetch_report(
    services: &AppServices,
    api_key: &ApiKey,
    location: Location,
    title: String,
    map_label: String,
    include_forecast: bool,
) -> Result<WeatherReport, WeatherError> {
    tracing::info!(
        "Fetching weather for {} ({:.4}, {:.4})",
        location.label(),
        location.latitude,
        location.longitude
    );

    let units = services.settings().units;
    let raw = services
        .weather()
        .fetch_current(api_key, location.latitude, location.longitude, units)
        .await?;
    let current = normalize_current(&raw)?;

    let mut warnings = Vec::new();
    let forecast = if include_forecast {
        match fetch_forecast(services, api_key, &location).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                tracing::warn!("Forecast unavailable: {}", e);
                warnings.push(format!("Forecast unavailable. {}", e.user_message()));
                None
            }
        }
    } else {
        None
    };

    Ok(WeatherReport {
        title,
        location,
        map_label,
        current,
        forecast,
        warnings,
        units,
    })
}

async fn fetch_forecast(
    services: &AppServices,
    api_key: &ApiKey,
    location: &Location,
) -> Result<Forecast, WeatherError> {
    let settings = services.settings();
    let raw = services
        .weather()
        .fetch_forecast(
            api_key,
            location.latitude,
            location.longitude,
            settings.units,
            settings.forecast_days,
        )
        .await?;
    group_forecast(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_services::LookupSettings;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use skycast_core::{DisplayConfig, NetworkError, Units};
    use skycast_weather::{Geocoder, IpLocator, WeatherSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeGeocoder;

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn locate_by_name(&self, query: &str) -> Result<Location, WeatherError> {
            if query.starts_with("Zzz") {
                return Err(WeatherError::LocationNotFound(query.to_string()));
            }
            Ok(Location {
                latitude: 51.5074,
                longitude: -0.1278,
                name: query.to_string(),
                country_code: Some("GB".to_string()),
                address: None,
            })
        }
    }

    struct FakeLocator;

    #[async_trait]
    impl IpLocator for FakeLocator {
        async fn locate_current(&self) -> Location {
            Location {
                latitude: 40.7128,
                longitude: -74.0060,
                name: "New York".to_string(),
                country_code: Some("US".to_string()),
                address: None,
            }
        }
    }

    #[derive(Default)]
    struct FakeWeather {
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
        requested_units: Mutex<Option<Units>>,
        fail_forecast: bool,
        reject_key: bool,
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch_current(
            &self,
            _api_key: &ApiKey,
            _latitude: f64,
            _longitude: f64,
            units: Units,
        ) -> Result<Value, WeatherError> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            *self.requested_units.lock().unwrap() = Some(units);
            if self.reject_key {
                return Err(WeatherError::Network(NetworkError::ServerError {
                    status: 401,
                    message: "Invalid API key.".to_string(),
                }));
            }
            Ok(json!({
                "name": "London",
                "timezone": 0,
                "main": {"temp": 15.3, "feels_like": 14.1, "humidity": 72, "pressure": 1012},
                "visibility": 10000,
                "wind": {"speed": 4.6, "deg": 250},
                "weather": [{"description": "light rain", "icon": "10d"}],
                "sys": {"country": "GB", "sunrise": 1718682000, "sunset": 1718741400},
                "clouds": {"all": 75}
            }))
        }

        async fn fetch_forecast(
            &self,
            _api_key: &ApiKey,
            _latitude: f64,
            _longitude: f64,
            _units: Units,
            days: u32,
        ) -> Result<Value, WeatherError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_forecast {
                return Err(WeatherError::Network(NetworkError::ServerError {
                    status: 503,
                    message: "unavailable".to_string(),
                }));
            }
            let list: Vec<Value> = (0..days * 8)
                .map(|i| {
                    json!({
                        "dt": 1717200000 + 10800 * i as i64,
                        "main": {"temp": 10.0 + i as f64, "humidity": 60},
                        "weather": [{"description": "scattered clouds", "icon": "03d"}],
                        "wind": {"speed": 3.5}
                    })
                })
                .collect();
            Ok(json!({"list": list, "city": {"timezone": 0}}))
        }
    }

    fn services(weather: Arc<FakeWeather>) -> AppServices {
        services_with(weather, LookupSettings::default())
    }

    fn services_with(weather: Arc<FakeWeather>, settings: LookupSettings) -> AppServices {
        AppServices::new(Arc::new(FakeGeocoder), Arc::new(FakeLocator), weather, settings)
    }

    fn session() -> Session {
        Session::new(&DisplayConfig::default()).with_api_key(ApiKey::new("test-key"))
    }

    #[tokio::test]
    async fn test_missing_key_blocks_every_action() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let mut session = Session::new(&DisplayConfig::default());

        let err = search_city(&services, &mut session, "London").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
        let err = lookup_current_location(&services, &mut session).await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
        assert!(quick_check(&services, &session).await.is_err());

        assert_eq!(weather.current_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_city_skips_weather_fetch() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let mut session = session();

        let err = search_city(&services, &mut session, "Zzzzzznotacity")
            .await
            .unwrap_err();
        assert!(err.user_message().contains("not found"));
        assert_eq!(weather.current_calls.load(Ordering::SeqCst), 0);
        assert!(session.last_lookup().is_none());
    }

    #[tokio::test]
    async fn test_blank_query_asks_for_city() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let mut session = session();

        let err = search_city(&services, &mut session, "   ").await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter a city name to search.");
        assert_eq!(weather.current_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_builds_full_report() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let mut session = session();

        let report = search_city(&services, &mut session, " London ").await.unwrap();
        assert_eq!(report.title, "Weather in London");
        assert_eq!(report.map_label, "London");
        assert_eq!(report.display_temperature(), 15);
        assert_eq!(report.current.visibility_km, 10.0);

        let forecast = report.forecast.as_ref().unwrap();
        assert_eq!(forecast.entries.len(), 40);
        assert_eq!(forecast.days.len(), 5);
        assert!(report.warnings.is_empty());

        assert_eq!(session.mode, LocationMode::SearchCity);
        assert!(session.last_lookup().is_some());
    }

    #[tokio::test]
    async fn test_forecast_toggle_off_skips_forecast() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let mut session = session();
        session.show_forecast = false;

        let report = lookup_current_location(&services, &mut session).await.unwrap();
        assert_eq!(report.title, "Your Current Location");
        assert_eq!(report.map_label, "New York, US");
        assert!(report.forecast.is_none());
        assert_eq!(weather.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forecast_failure_keeps_current_conditions() {
        let weather = Arc::new(FakeWeather {
            fail_forecast: true,
            ..FakeWeather::default()
        });
        let services = services(weather.clone());
        let mut session = session();

        let report = search_city(&services, &mut session, "London").await.unwrap();
        assert!(report.forecast.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Forecast unavailable."));
        assert_eq!(report.display_temperature(), 15);
    }

    #[tokio::test]
    async fn test_quick_check_covers_every_city_without_forecast() {
        let weather = Arc::new(FakeWeather::default());
        let services = services(weather.clone());
        let session = session();

        let check = quick_check(&services, &session).await.unwrap();
        let names: Vec<&str> = check.results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, QUICK_CITIES);
        assert!(check.results.iter().all(|(_, r)| r.is_ok()));
        assert!(check.any_succeeded());

        assert_eq!(weather.current_calls.load(Ordering::SeqCst), QUICK_CITIES.len());
        assert_eq!(weather.forecast_calls.load(Ordering::SeqCst), 0);
        assert!(session.last_lookup().is_none());
    }

    #[tokio::test]
    async fn test_quick_check_with_rejected_key_has_no_success() {
        let weather = Arc::new(FakeWeather {
            reject_key: true,
            ..FakeWeather::default()
        });
        let services = services(weather.clone());
        let session = session();

        let check = quick_check(&services, &session).await.unwrap();
        assert_eq!(check.results.len(), QUICK_CITIES.len());
        assert!(check.results.iter().all(|(_, r)| r.is_err()));
        assert!(!check.any_succeeded());
    }

    #[test]
    fn test_quick_check_without_reports_is_not_success() {
        let empty = QuickCheck::default();
        assert!(!empty.any_succeeded());

        let mixed = QuickCheck {
            results: vec![
                ("Paris".to_string(), Err(WeatherError::LocationNotFound("Paris".into()))),
                ("Cairo".to_string(), Err(WeatherError::MissingApiKey)),
            ],
        };
        assert!(!mixed.any_succeeded());
    }

    #[tokio::test]
    async fn test_lookup_requests_configured_units() {
        let weather = Arc::new(FakeWeather::default());
        let services = services_with(
            weather.clone(),
            LookupSettings {
                units: Units::Imperial,
                ..LookupSettings::default()
            },
        );
        let mut session = session();

        let report = search_city(&services, &mut session, "London").await.unwrap();
        assert_eq!(report.units, Units::Imperial);
        assert_eq!(*weather.requested_units.lock().unwrap(), Some(Units::Imperial));
    }
}
