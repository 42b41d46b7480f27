//! Fixtures shared by the wiremock-based tests.

#![allow(dead_code)]

use std::time::Duration;

use cityweather_core::OpenWeatherProvider;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const API_KEY: &str = "TEST_KEY";

/// `/weather` body for Paris at the given temperature.
pub fn current_body(temp: f64) -> Value {
    json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "base": "stations",
        "main": { "temp": temp, "feels_like": temp - 0.4, "temp_min": temp - 1.0, "temp_max": temp + 1.0, "pressure": 1016, "humidity": 60 },
        "visibility": 10000,
        "wind": { "speed": 3.6, "deg": 250 },
        "clouds": { "all": 0 },
        "dt": 1_700_000_000,
        "sys": { "type": 2, "id": 2041230, "country": "FR", "sunrise": 1_699_944_000, "sunset": 1_699_978_000 },
        "timezone": 3600,
        "id": 2988507,
        "name": "Paris",
        "cod": 200
    })
}

/// `/forecast` body with 40 three-hour entries.
pub fn forecast_body(temp: f64) -> Value {
    let list: Vec<Value> = (0..40)
        .map(|i: i64| {
            json!({
                "dt": 1_700_006_400 + i * 10_800,
                "main": { "temp": temp + (i % 8) as f64, "feels_like": temp, "humidity": 55 + (i % 10) },
                "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
                "wind": { "speed": 2.5, "deg": 180 },
                "dt_txt": "2023-11-15 00:00:00"
            })
        })
        .collect();
    json!({
        "cod": "200",
        "message": 0,
        "cnt": 40,
        "list": list,
        "city": { "name": "Paris", "country": "FR", "coord": { "lat": 48.8534, "lon": 2.3488 } }
    })
}

pub fn air_body(aqi: u8) -> Value {
    json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "list": [{ "main": { "aqi": aqi }, "components": { "co": 230.31, "pm2_5": 5.1 }, "dt": 1_700_000_000 }]
    })
}

pub fn provider(server: &MockServer) -> OpenWeatherProvider {
    provider_with_timeout(server, Duration::from_secs(5))
}

pub fn provider_with_timeout(server: &MockServer, timeout: Duration) -> OpenWeatherProvider {
    #[allow(clippy::expect_used)]
    OpenWeatherProvider::new(API_KEY, &server.uri(), timeout).expect("Failed to create provider")
}

/// Mount `/weather`, `/forecast` and `/air_pollution` mocks answering for `units`.
pub async fn mount_success(server: &MockServer, units: &str, temp: f64, aqi: u8) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", units))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(temp)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("units", units))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(temp)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_body(aqi)))
        .mount(server)
        .await;
}
