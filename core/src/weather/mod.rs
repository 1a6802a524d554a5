//! Weather API client and service used by the weather tool

pub mod api;
pub mod service;

pub use api::WeatherApiClient;
pub use service::WeatherService;
