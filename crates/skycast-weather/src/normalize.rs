//! Maps raw OpenWeatherMap JSON into the stable internal shape.
//!
//! Every response first goes through a typed schema; a missing required
//! field fails the whole response with `MalformedResponse`.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{CurrentWeatherRecord, DailyForecastSummary, Forecast, ForecastEntry, WeatherError};

/// Number of day tiles kept by `group_forecast`.
pub const FORECAST_TILE_DAYS: usize = 5;

const NOON_HOUR: u32 = 12;

mod raw {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        /// Shift in seconds from UTC
        pub timezone: Option<i32>,
        pub main: CurrentMain,
        /// Meters
        pub visibility: Option<f64>,
        pub wind: Wind,
        pub weather: Vec<Condition>,
        pub sys: Sys,
        pub clouds: Clouds,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentMain {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u8,
        pub pressure: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
        pub deg: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Sys {
        pub country: Option<String>,
        pub sunrise: i64,
        pub sunset: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Clouds {
        pub all: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastItem>,
        pub city: Option<City>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub timezone: Option<i32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        pub main: ForecastMain,
        pub weather: Vec<Condition>,
        pub wind: ForecastWind,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastWind {
        pub speed: f64,
    }
}

/// Normalize a current-weather response.
pub fn normalize_current(json: &Value) -> Result<CurrentWeatherRecord, WeatherError> {
    let response = raw::CurrentResponse::deserialize(json)
        .map_err(|e| WeatherError::MalformedResponse(format!("current weather: {}", e)))?;

    let offset = utc_offset(response.timezone);
    let condition = first_condition(response.weather)?;

    Ok(CurrentWeatherRecord {
        city: response.name,
        country: response.sys.country,
        temperature: response.main.temp,
        feels_like: response.main.feels_like,
        humidity: response.main.humidity,
        pressure: response.main.pressure,
        visibility_km: response.visibility.unwrap_or(0.0) / 1000.0,
        wind_speed: response.wind.speed,
        wind_direction: response.wind.deg.map(compass_degrees).unwrap_or(0),
        description: title_case(&condition.description),
        icon: condition.icon,
        sunrise: local_time(response.sys.sunrise, offset)?,
        sunset: local_time(response.sys.sunset, offset)?,
        clouds: response.clouds.all,
    })
}

/// Map the raw forecast list to entries, preserving input order.
pub fn forecast_entries(json: &Value) -> Result<Vec<ForecastEntry>, WeatherError> {
    let response = raw::ForecastResponse::deserialize(json)
        .map_err(|e| WeatherError::MalformedResponse(format!("forecast: {}", e)))?;

    let offset = utc_offset(response.city.and_then(|c| c.timezone));

    response
        .list
        .into_iter()
        .map(|item| {
            let condition = first_condition(item.weather)?;
            Ok(ForecastEntry {
                timestamp: local_time(item.dt, offset)?,
                temperature: item.main.temp,
                description: condition.description,
                icon: condition.icon,
                humidity: item.main.humidity,
                wind_speed: item.wind.speed,
            })
        })
        .collect()
}

/// Group entries by calendar date in first-seen order.
///
/// Every entry lands in exactly one group. Each group's representative is the
/// first entry minimizing |hour - 12|.
pub fn group_entries(entries: &[ForecastEntry]) -> Vec<DailyForecastSummary> {
    let mut groups: Vec<(NaiveDate, Vec<ForecastEntry>)> = Vec::new();

    for entry in entries {
        let date = entry.timestamp.date_naive();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, members)) => members.push(entry.clone()),
            None => groups.push((date, vec![entry.clone()])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(date, members)| summarize_day(date, members))
        .collect()
}

/// Normalize a forecast response into the full series plus day tiles.
pub fn group_forecast(json: &Value) -> Result<Forecast, WeatherError> {
    let entries = forecast_entries(json)?;
    let mut days = group_entries(&entries);
    days.truncate(FORECAST_TILE_DAYS);

    tracing::debug!(
        "Normalized forecast: {} slots, {} day tiles",
        entries.len(),
        days.len()
    );

    Ok(Forecast { entries, days })
}

fn summarize_day(date: NaiveDate, members: Vec<ForecastEntry>) -> Option<DailyForecastSummary> {
    // min_by_key keeps the first of equal minima
    let representative = members
        .iter()
        .min_by_key(|e| e.timestamp.hour().abs_diff(NOON_HOUR))?
        .clone();

    let (min_temperature, max_temperature) = members.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), e| (lo.min(e.temperature), hi.max(e.temperature)),
    );

    Some(DailyForecastSummary {
        date,
        representative,
        min_temperature,
        max_temperature,
        entries: members,
    })
}

fn first_condition(conditions: Vec<raw::Condition>) -> Result<raw::Condition, WeatherError> {
    conditions
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MalformedResponse("empty weather condition list".to_string()))
}

fn utc_offset(seconds: Option<i32>) -> FixedOffset {
    seconds
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

fn local_time(epoch_seconds: i64, offset: FixedOffset) -> Result<DateTime<FixedOffset>, WeatherError> {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|t| t.with_timezone(&offset))
        .ok_or_else(|| {
            WeatherError::MalformedResponse(format!("timestamp out of range: {}", epoch_seconds))
        })
}

fn compass_degrees(deg: f64) -> u16 {
    // 360 wraps to 0
    (deg.rem_euclid(360.0).round() as u16) % 360
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
