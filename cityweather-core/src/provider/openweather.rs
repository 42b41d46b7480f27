use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    error::FetchError,
    model::{Coordinates, UnitSystem},
    provider::payload::{AirPollutionPayload, CurrentEnvelope, ForecastPayload},
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
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::unexpected(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, FetchError> {
        Url::parse(&format!("{}/{name}", self.base_url))
            .map_err(|e| FetchError::unexpected(format!("Invalid endpoint URL for {name}: {e}")))
    }

    /// GET `endpoint` with `params` (percent-encoded by the builder) and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint(endpoint)?;

        let res = self
            .http
            .get(url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                debug!(endpoint, error = %e, "Request to provider failed before a response");
                FetchError::from_transport(&e)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| FetchError::from_transport(&e))?;

        if !status.is_success() {
            debug!(endpoint, %status, body = %truncate_body(&body), "Provider returned an error status");
            return Err(FetchError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            FetchError::unexpected(format!(
                "Failed to parse {endpoint} JSON: {e}; body: {}",
                truncate_body(&body)
            ))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(units = %units))]
    async fn current(&self, city: &str, units: UnitSystem) -> Result<CurrentEnvelope, FetchError> {
        self.get_json("weather", &[("q", city), ("units", units.as_str())])
            .await
    }

    #[instrument(skip(self), fields(units = %units))]
    async fn forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<ForecastPayload, FetchError> {
        self.get_json("forecast", &[("q", city), ("units", units.as_str())])
            .await
    }

    #[instrument(skip(self), fields(lat = %coords.lat, lon = %coords.lon))]
    async fn air_pollution(&self, coords: Coordinates) -> Result<AirPollutionPayload, FetchError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        self.get_json("air_pollution", &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
