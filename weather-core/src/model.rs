use serde::{Deserialize, Serialize};

/// Current conditions for a city, reshaped from the upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    /// Degrees Celsius, rounded.
    pub temperature: i64,
    pub description: String,
    pub icon: String,
    /// Relative humidity in percent.
    pub humidity: i64,
    pub wind_speed: f64,
}

/// One calendar day of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Short weekday name, e.g. "Sat".
    pub day: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub temp_min: i64,
    pub temp_max: i64,
    pub icon: String,
    pub description: String,
}

/// A single 3-hour forecast entry as delivered upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix timestamp, seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub icon: String,
    pub description: String,
}

/// A saved city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub id: i64,
    pub city_name: String,
}
