//! Terminal presentation of a `WeatherReport`.

pub mod chart;

use std::fmt::Write;

use skycast_core::{Config, Units};
use skycast_weather::{normalize::title_case, CurrentWeatherRecord, DailyForecastSummary, Forecast};

use crate::models::{round_display, WeatherReport};

pub use chart::render_trend;

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Layout and link settings for the presenter
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub icon_host: String,
    pub chart_width: usize,
    pub chart_height: usize,
    pub show_map: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            icon_host: config.weather.icon_host.clone(),
            chart_width: config.display.chart_width,
            chart_height: config.display.chart_height,
            show_map: config.display.show_map,
        }
    }
}

/// Icon image for a condition code, e.g. "10d".
pub fn icon_url(host: &str, code: &str) -> String {
    format!("{}/img/wn/{}@2x.png", host.trim_end_matches('/'), code)
}

/// 16-point compass name for a bearing in degrees.
pub fn compass_point(degrees: u16) -> &'static str {
    let idx = ((degrees % 360) as f64 / 22.5).round() as usize % COMPASS.len();
    COMPASS[idx]
}

/// Full report: current block, forecast (if any), map (if enabled), warnings.
pub fn render_report(report: &WeatherReport, options: &RenderOptions) -> String {
    let mut out = String::new();

    out.push_str(&render_current(report, &options.icon_host));

    if let Some(forecast) = &report.forecast {
        out.push('\n');
        out.push_str(&render_forecast(forecast, report.units, options));
    }

    if options.show_map {
        out.push('\n');
        out.push_str(&render_map(report));
    }

    for warning in &report.warnings {
        let _ = writeln!(out, "\n! {}", warning);
    }

    out
}

pub fn render_current(report: &WeatherReport, icon_host: &str) -> String {
    let current: &CurrentWeatherRecord = &report.current;
    let temp_unit = report.units.temperature_label();
    let speed_unit = report.units.speed_label();

    let mut out = String::new();
    let _ = writeln!(out, "{}", report.title);
    let _ = writeln!(out, "{}", "=".repeat(report.title.chars().count()));
    let _ = writeln!(out, "{}", report.station_label());
    let _ = writeln!(
        out,
        "{}{}  {}",
        report.display_temperature(),
        temp_unit,
        current.description
    );
    let _ = writeln!(out, "Feels like   {}{}", report.display_feels_like(), temp_unit);
    let _ = writeln!(out, "Humidity     {}%", current.humidity);
    let _ = writeln!(out, "Pressure     {} hPa", current.pressure);
    let _ = writeln!(out, "Visibility   {:.1} km", current.visibility_km);
    let _ = writeln!(
        out,
        "Wind         {:.1} {} {} ({}°)",
        current.wind_speed,
        speed_unit,
        compass_point(current.wind_direction),
        current.wind_direction
    );
    let _ = writeln!(out, "Clouds       {}%", current.clouds);
    let _ = writeln!(out, "Sunrise      {}", current.sunrise.format("%H:%M"));
    let _ = writeln!(out, "Sunset       {}", current.sunset.format("%H:%M"));
    let _ = writeln!(out, "Icon         {}", icon_url(icon_host, &current.icon));
    out
}

pub fn render_forecast(forecast: &Forecast, units: Units, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}-Day Forecast", forecast.days.len());

    for day in &forecast.days {
        out.push_str(&render_tile(day, units));
    }

    out.push('\n');
    let _ = writeln!(out, "Temperature Trend");
    out.push_str(&render_trend(
        &forecast.entries,
        options.chart_width,
        options.chart_height,
        units.temperature_label(),
    ));
    out
}

/// One line per day: date, high/low, condition, icon code.
pub fn render_tile(day: &DailyForecastSummary, units: Units) -> String {
    format!(
        "  {:<12} {:>4}°/{}{:<3} {:<20} [{}]\n",
        day.date.format("%a, %b %d").to_string(),
        round_display(day.max_temperature),
        round_display(day.min_temperature),
        units.temperature_label(),
        title_case(&day.representative.description),
        day.representative.icon
    )
}

/// Coordinates plus an OpenStreetMap link centered on the pin.
pub fn render_map(report: &WeatherReport) -> String {
    let lat = report.location.latitude;
    let lon = report.location.longitude;
    format!(
        "Map: {} at ({:.4}, {:.4})\n  https://www.openstreetmap.org/?mlat={:.4}&mlon={:.4}#map=10/{:.4}/{:.4}\n",
        report.map_label, lat, lon, lat, lon, lat, lon
    )
}
