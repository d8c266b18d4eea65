//! Skycast presentation layer
//!
//! Session state, the lookup actions that drive the weather pipeline, and
//! text rendering of the results.

pub mod app_services;
pub mod models;
pub mod render;
pub mod services;
pub mod session;

pub use app_services::{AppServices, LookupSettings};
pub use models::WeatherReport;
pub use render::{render_report, RenderOptions};
pub use session::{LocationMode, Session};
