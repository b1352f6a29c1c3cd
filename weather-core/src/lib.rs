//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its error classification
//! - Bucketing of 3-hour forecast samples into daily summaries
//! - SQLite storage of favorite cities
//! - Shared domain models
//!
//! It is used by `weather-dashboard`, but can also be reused by other binaries or services.

pub mod config;
pub mod favorites;
pub mod forecast;
pub mod model;
pub mod provider;

pub use config::Config;
pub use favorites::{FavoritesError, FavoritesStore};
pub use model::{CurrentWeather, FavoriteCity, ForecastDay, ForecastSample};
pub use provider::{Endpoint, WeatherError, WeatherProvider, openweather::OpenWeatherProvider};
