pub mod weather_model;

pub use weather_model::{round_display, WeatherReport};
