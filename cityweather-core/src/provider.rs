use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, UnitSystem},
    provider::{
        openweather::OpenWeatherProvider,
        payload::{AirPollutionPayload, CurrentEnvelope, ForecastPayload},
    },
};

pub mod openweather;
pub mod payload;

/// The three endpoints the aggregation pipeline depends on.
///
/// Implementations classify every failure into a [`FetchError`] and do no
/// retrying of their own.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str, units: UnitSystem)
    -> Result<CurrentEnvelope, FetchError>;

    async fn forecast(&self, city: &str, units: UnitSystem)
    -> Result<ForecastPayload, FetchError>;

    async fn air_pollution(&self, coords: Coordinates) -> Result<AirPollutionPayload, FetchError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `cityweather configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = OpenWeatherProvider::new(api_key, &config.base_url, config.timeout())?;
    Ok(Arc::new(provider))
}
