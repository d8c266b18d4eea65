pub mod weather_service;

pub use weather_service::{
    lookup_current_location, quick_check, search_city, QuickCheck, QUICK_CITIES,
};
