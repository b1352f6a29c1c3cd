//! Integration tests for OpenWeatherProvider using wiremock.
//!
//! These tests verify response reshaping and failure classification against
//! a mock HTTP server.

use chrono::{Local, TimeZone};
use weather_core::{Endpoint, OpenWeatherProvider, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build a current-weather body
fn current_body(temp: f64, description: &str) -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": "Chennai",
        "sys": { "country": "IN" },
        "main": { "temp": temp, "humidity": 74 },
        "weather": [{ "description": description, "icon": "04d" }],
        "wind": { "speed": 5.14 }
    })
}

/// Helper to build a forecast entry
fn forecast_entry(dt: i64, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": { "temp": temp },
        "weather": [{ "description": "light rain", "icon": "10d" }]
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url("TEST_KEY".to_string(), server.uri())
}

#[tokio::test]
async fn test_current_weather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Chennai"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(31.6, "broken clouds")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let current = provider(&mock_server).fetch_current("Chennai").await.unwrap();

    assert_eq!(current.city, "Chennai");
    assert_eq!(current.country, "IN");
    assert_eq!(current.temperature, 32);
    assert_eq!(current.description, "Broken clouds");
    assert_eq!(current.icon, "04d");
    assert_eq!(current.humidity, 74);
    assert!((current.wind_speed - 5.14).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_current_weather_accepts_string_code() {
    let mock_server = MockServer::start().await;

    let mut body = current_body(12.2, "mist");
    body["cod"] = serde_json::json!("200");

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let current = provider(&mock_server).fetch_current("Chennai").await.unwrap();
    assert_eq!(current.temperature, 12);
    assert_eq!(current.description, "Mist");
}

#[tokio::test]
async fn test_current_weather_city_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_current("Atlantis").await.unwrap_err();

    assert!(matches!(err, WeatherError::NotFound(ref msg) if msg == "city not found"));
}

#[tokio::test]
async fn test_current_weather_rejection_without_message_uses_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": 500 })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_current("Chennai").await.unwrap_err();

    assert_eq!(err.to_string(), "City not found or invalid response.");
}

#[tokio::test]
async fn test_current_weather_non_json_error_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_current("Chennai").await.unwrap_err();

    assert!(matches!(
        err,
        WeatherError::ServiceUnavailable { endpoint: Endpoint::Current, .. }
    ));
    assert_eq!(err.to_string(), "Could not connect to the weather service.");
}

#[tokio::test]
async fn test_current_weather_unexpected_shape_is_internal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": 200,
            "name": "Chennai"
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_current("Chennai").await.unwrap_err();

    assert!(matches!(err, WeatherError::Internal { endpoint: Endpoint::Current, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    // Nothing listens on port 1.
    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".to_string(), "http://127.0.0.1:1");
    let err = provider.fetch_forecast("Chennai").await.unwrap_err();

    assert!(matches!(
        err,
        WeatherError::ServiceUnavailable { endpoint: Endpoint::Forecast, .. }
    ));
    assert_eq!(err.to_string(), "Could not connect to the weather service for forecast.");
    // The reqwest error stays attached for logging.
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_forecast_groups_into_five_days() {
    let mock_server = MockServer::start().await;

    // One sample per day at the same instant, six days in a row: each lands
    // on a distinct local date whatever the machine's time zone.
    let start = 1_717_243_200; // 2024-06-01T12:00:00Z
    let list: Vec<_> = (0..6)
        .map(|d| forecast_entry(start + d * 86_400, 20.0 + d as f64))
        .collect();

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Chennai"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "list": list
        })))
        .mount(&mock_server)
        .await;

    let days = provider(&mock_server).fetch_forecast("Chennai").await.unwrap();

    assert_eq!(days.len(), 5);
    assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(days[0].temp_min, 20);
    assert_eq!(days[4].temp_max, 24);
    assert!(days.iter().all(|d| d.description == "Light rain" && d.icon == "10d"));
}

#[tokio::test]
async fn test_forecast_accepts_numeric_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": 200,
            "list": [forecast_entry(1_717_243_200, 18.0)]
        })))
        .mount(&mock_server)
        .await;

    let days = provider(&mock_server).fetch_forecast("Chennai").await.unwrap();
    assert_eq!(days.len(), 1);
}

#[tokio::test]
async fn test_forecast_rejected_uses_default_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({ "cod": 401 })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_forecast("Chennai").await.unwrap_err();

    assert!(matches!(err, WeatherError::NotFound(ref msg) if msg == "Forecast data not available."));
}

#[tokio::test]
async fn test_forecast_entry_without_conditions_is_internal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "list": [{ "dt": 1_717_243_200, "main": { "temp": 18.0 }, "weather": [] }]
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch_forecast("Chennai").await.unwrap_err();

    assert!(matches!(err, WeatherError::Internal { endpoint: Endpoint::Forecast, .. }));
}

/// A `/weather` body as OpenWeather actually sends it.
fn full_current_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04n" }],
        "base": "stations",
        "main": {
            "temp": 12.47,
            "feels_like": 11.91,
            "temp_min": 11.12,
            "temp_max": 13.58,
            "pressure": 1012,
            "humidity": 83
        },
        "visibility": 10000,
        "wind": { "speed": 4.12, "deg": 240 },
        "clouds": { "all": 75 },
        "dt": 1_717_275_600,
        "sys": { "type": 2, "id": 2_075_535, "country": "GB", "sunrise": 1_717_213_000, "sunset": 1_717_272_500 },
        "timezone": 3600,
        "id": 2_643_743,
        "name": "London",
        "cod": 200
    })
}

/// A `/forecast` body as OpenWeather actually sends it: `cod` is a string,
/// `message` is the number `0` and every entry carries the full set of fields.
fn full_forecast_body(start: i64, entries: usize) -> serde_json::Value {
    let conditions = [
        (500, "Rain", "light rain", "10"),
        (800, "Clear", "clear sky", "01"),
        (803, "Clouds", "broken clouds", "04"),
        (802, "Clouds", "scattered clouds", "03"),
        (501, "Rain", "moderate rain", "10"),
    ];
    let list: Vec<_> = (0..entries)
        .map(|i| {
            let dt = start + i as i64 * 3 * 3600;
            let (id, main, description, icon) = conditions[i % conditions.len()];
            let pod = if (i % 8) < 4 { "n" } else { "d" };
            serde_json::json!({
                "dt": dt,
                "main": {
                    "temp": 10.0 + (i % 8) as f64 * 1.5,
                    "feels_like": 9.4,
                    "temp_min": 9.8,
                    "temp_max": 21.2,
                    "pressure": 1015,
                    "sea_level": 1015,
                    "grnd_level": 1011,
                    "humidity": 71,
                    "temp_kf": 0.37
                },
                "weather": [{ "id": id, "main": main, "description": description, "icon": format!("{icon}{pod}") }],
                "clouds": { "all": 64 },
                "wind": { "speed": 3.2, "deg": 215, "gust": 6.1 },
                "visibility": 10000,
                "pop": 0.2,
                "sys": { "pod": pod },
                "dt_txt": "2024-06-01 00:00:00"
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": entries,
        "list": list,
        "city": {
            "id": 2_643_743,
            "name": "London",
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "country": "GB",
            "population": 1_000_000,
            "timezone": 3600,
            "sunrise": 1_717_213_000,
            "sunset": 1_717_272_500
        }
    })
}

#[tokio::test]
async fn test_full_current_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_current_body()))
        .mount(&mock_server)
        .await;

    let current = provider(&mock_server).fetch_current("London").await.unwrap();

    assert_eq!(current.city, "London");
    assert_eq!(current.country, "GB");
    assert_eq!(current.temperature, 12);
    assert_eq!(current.description, "Broken clouds");
    assert_eq!(current.icon, "04n");
    assert_eq!(current.humidity, 83);
    assert!((current.wind_speed - 4.12).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_full_forecast_payload() {
    let mock_server = MockServer::start().await;

    // Six days of 3-hourly entries from 2024-06-01T00:00:00Z.
    let body = full_forecast_body(1_717_200_000, 48);
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let days = provider(&mock_server).fetch_forecast("London").await.unwrap();

    assert_eq!(days.len(), 5);
    assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    for day in &days {
        assert!(day.temp_min <= day.temp_max, "{day:?}");
        assert!((10..=21).contains(&day.temp_min) && (10..=21).contains(&day.temp_max), "{day:?}");
        assert!(
            ["Light rain", "Clear sky", "Broken clouds", "Scattered clouds", "Moderate rain"]
                .contains(&day.description.as_str()),
            "{day:?}"
        );
    }

    // The middle day is a whole local day whatever the server's zone, so its
    // summary comes from its fourth sample.
    let middle = &days[2];
    let same_day: Vec<_> = body["list"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| {
            let local = Local.timestamp_opt(entry["dt"].as_i64().unwrap(), 0).unwrap();
            local.date_naive().format("%Y-%m-%d").to_string() == middle.date
        })
        .collect();
    assert_eq!(same_day.len(), 8);
    let representative = &same_day[3]["weather"][0];
    assert_eq!(middle.icon, representative["icon"]);
    let description = representative["description"].as_str().unwrap();
    assert_eq!(middle.description.to_lowercase(), description);
}
