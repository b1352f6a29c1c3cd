use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    forecast::{aggregate_daily, capitalize, round_temperature},
    model::{CurrentWeather, ForecastDay, ForecastSample},
    provider::{Endpoint, WeatherError},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another deployment of the API (or a mock server).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// Issue a lookup for `city` and deserialize a success-coded body into `T`.
    ///
    /// Classification order: transport failure, unparseable body, non-success
    /// application code, unexpected payload shape.
    async fn request<T: DeserializeOwned>(&self, endpoint: Endpoint, city: &str) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint_path(endpoint));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| transport_failure(endpoint, "failed to send request", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| transport_failure(endpoint, "failed to read response body", e))?;

        let envelope: OwEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(unavailable(
                    endpoint,
                    format!("status {}: {}", status, truncate_body(&body)),
                ));
            }
            Err(e) => return Err(internal(endpoint, format!("unparseable body: {e}"))),
        };

        if !envelope.is_success() {
            let message = envelope
                .message_text()
                .unwrap_or_else(|| endpoint.not_found_message().to_string());
            tracing::info!(%endpoint, city, %status, %message, "OpenWeather rejected lookup");
            return Err(WeatherError::NotFound(message));
        }

        serde_json::from_str(&body).map_err(|e| internal(endpoint, format!("unexpected payload: {e}")))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let parsed: OwCurrentResponse = self.request(Endpoint::Current, city).await?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| internal(Endpoint::Current, "response contained no weather conditions"))?;

        Ok(CurrentWeather {
            city: parsed.name,
            country: parsed.sys.country,
            temperature: round_temperature(parsed.main.temp),
            description: capitalize(&condition.description),
            icon: condition.icon,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
        })
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        let parsed: OwForecastResponse = self.request(Endpoint::Forecast, city).await?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let condition = entry.weather.into_iter().next().ok_or_else(|| {
                    internal(Endpoint::Forecast, format!("entry {} has no weather conditions", entry.dt))
                })?;
                Ok(ForecastSample {
                    timestamp: entry.dt,
                    temperature: entry.main.temp,
                    icon: condition.icon,
                    description: condition.description,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(aggregate_daily(&samples, &Local))
    }
}

fn endpoint_path(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Current => "weather",
        Endpoint::Forecast => "forecast",
    }
}

fn unavailable(endpoint: Endpoint, detail: impl Into<String>) -> WeatherError {
    let detail = detail.into();
    tracing::error!(%endpoint, %detail, "OpenWeather request failed");
    WeatherError::ServiceUnavailable { endpoint, detail, source: None }
}

fn transport_failure(endpoint: Endpoint, what: &str, source: reqwest::Error) -> WeatherError {
    tracing::error!(%endpoint, error = %source, "OpenWeather request failed: {what}");
    WeatherError::ServiceUnavailable {
        endpoint,
        detail: what.to_string(),
        source: Some(source),
    }
}

fn internal(endpoint: Endpoint, detail: impl Into<String>) -> WeatherError {
    let detail = detail.into();
    tracing::error!(%endpoint, %detail, "could not process OpenWeather response");
    WeatherError::Internal { endpoint, detail }
}

/// Application-level status code. The current-weather endpoint sends the
/// number `200`, the forecast endpoint the string `"200"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn is_success(&self) -> bool {
        match self {
            OwCode::Number(code) => *code == 200,
            OwCode::Text(code) => code.trim() == "200",
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    #[serde(default)]
    cod: Option<OwCode>,
    /// Error text on failures; successful forecast bodies carry `0` here.
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl OwEnvelope {
    fn is_success(&self) -> bool {
        self.cod.as_ref().is_some_and(OwCode::is_success)
    }

    fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
