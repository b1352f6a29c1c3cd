use crate::model::{CurrentWeather, ForecastDay};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Upstream endpoint a request was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Message reported when the upstream service cannot be reached.
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            Endpoint::Current => "Could not connect to the weather service.",
            Endpoint::Forecast => "Could not connect to the weather service for forecast.",
        }
    }

    /// Message reported when upstream rejects the request without saying why.
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Endpoint::Current => "City not found or invalid response.",
            Endpoint::Forecast => "Forecast data not available.",
        }
    }

    /// Message reported when a successful response cannot be reshaped.
    pub fn internal_message(&self) -> &'static str {
        match self {
            Endpoint::Current => "An internal server error occurred.",
            Endpoint::Forecast => "An internal server error occurred during forecast processing.",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a weather lookup.
///
/// The `Display` text is safe to hand to dashboard clients; the underlying
/// cause is kept in `detail` (and `source`) for server-side logging.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Upstream answered with a non-success application code.
    #[error("{0}")]
    NotFound(String),

    /// Upstream could not be reached or the response could not be read.
    /// `source` is set when the HTTP client itself failed.
    #[error("{}", .endpoint.unavailable_message())]
    ServiceUnavailable {
        endpoint: Endpoint,
        detail: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Upstream answered, but not in a shape we understand.
    #[error("{}", .endpoint.internal_message())]
    Internal { endpoint: Endpoint, detail: String },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Up to five daily summaries for `city`, ordered by date.
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError>;
}
