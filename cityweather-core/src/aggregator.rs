//! Fetch pipeline: join → validate → dependent fetch → merge.
//!
//! Current weather and forecast are one atomic result: if either call fails the
//! whole search fails. Air quality is fetched afterwards from the coordinates the
//! current-weather payload returned, and any failure there only leaves the
//! snapshot's `air_quality` empty.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::FetchError,
    model::{
        AirQuality, CompareSnapshot, Coordinates, ForecastEntry, ForecastSeries, SearchQuery,
        WeatherReport, WeatherSnapshot,
    },
    provider::{
        WeatherProvider,
        payload::{
            AirPollutionPayload, CurrentEnvelope, CurrentPayload, ForecastPayload,
            ProviderStatus, primary_condition,
        },
    },
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Aggregator {
    provider: Arc<dyn WeatherProvider>,
    timeout: Duration,
}

/// Output of the join stage.
#[derive(Debug)]
struct PrimaryPayloads {
    current: CurrentEnvelope,
    forecast: ForecastPayload,
}

/// A current-weather payload whose provider status has been checked.
#[derive(Debug)]
struct ValidatedCurrent(CurrentPayload);

impl Aggregator {
    pub fn new(provider: Arc<dyn WeatherProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn with_default_timeout(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::new(provider, DEFAULT_TIMEOUT)
    }

    /// Run the full primary search for `query`.
    #[instrument(skip(self, query), fields(city = %query.city(), units = %query.units()))]
    pub async fn fetch(&self, query: &SearchQuery) -> Result<WeatherReport, FetchError> {
        let primary = self.join_primary(query).await?;
        let current = validate(primary.current)?;

        let coords = Coordinates::from(&current.0.coord);
        let air_quality = self.air_quality(coords).await;

        let report = merge(query, current, primary.forecast, air_quality)?;
        info!(
            location = %report.snapshot.location_name,
            forecast_entries = report.forecast.len(),
            air_quality = ?report.snapshot.air_quality,
            "Search completed"
        );
        Ok(report)
    }

    /// Current weather only, for the comparison view.
    #[instrument(skip(self, query), fields(city = %query.city(), units = %query.units()))]
    pub async fn fetch_compare(&self, query: &SearchQuery) -> Result<CompareSnapshot, FetchError> {
        let current = self
            .bounded("current", self.provider.current(query.city(), query.units()))
            .await?;
        let ValidatedCurrent(current) = validate(current)?;

        Ok(CompareSnapshot {
            location_name: current.name,
            country: current.sys.country,
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            description: primary_condition(&current.weather).description,
            units: query.units(),
        })
    }

    async fn join_primary(&self, query: &SearchQuery) -> Result<PrimaryPayloads, FetchError> {
        let (current, forecast) = tokio::try_join!(
            self.bounded("current", self.provider.current(query.city(), query.units())),
            self.bounded("forecast", self.provider.forecast(query.city(), query.units())),
        )
        .inspect_err(|e| warn!(kind = e.kind(), error = %e, "Primary fetch failed"))?;

        Ok(PrimaryPayloads { current, forecast })
    }

    /// Best-effort: every failure is logged and reported as `None`.
    async fn air_quality(&self, coords: Coordinates) -> Option<AirQuality> {
        match self
            .bounded("air_pollution", self.provider.air_pollution(coords))
            .await
        {
            Ok(payload) => air_quality_from(&payload),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Air quality unavailable");
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(stage, timeout_ms = self.timeout.as_millis(), "Request timed out");
                Err(FetchError::NetworkUnreachable)
            }
        }
    }
}

/// Check the provider status field, then decode the weather fields.
fn validate(current: CurrentEnvelope) -> Result<ValidatedCurrent, FetchError> {
    if !current.cod.as_ref().is_some_and(ProviderStatus::is_success) {
        let code = current
            .cod
            .as_ref()
            .and_then(ProviderStatus::code)
            .unwrap_or(ProviderStatus::SUCCESS);
        let message = current.message().unwrap_or("Invalid response from server");
        warn!(
            status = ?current.cod,
            provider_message = message,
            "Provider status field is not success"
        );
        return Err(FetchError::server(code, message));
    }

    current
        .into_payload()
        .map(ValidatedCurrent)
        .map_err(|e| FetchError::unexpected(format!("Failed to parse weather JSON: {e}")))
}

fn air_quality_from(payload: &AirPollutionPayload) -> Option<AirQuality> {
    let Some(first) = payload.list.first() else {
        debug!("Air pollution list is empty");
        return None;
    };
    let aqi = AirQuality::from_index(first.main.aqi);
    if aqi.is_none() {
        warn!(aqi = first.main.aqi, "Air quality index out of range");
    }
    aqi
}

fn timestamp(ts: i64, field: &str) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::unexpected(format!("{field} timestamp {ts} out of range")))
}

fn merge(
    query: &SearchQuery,
    current: ValidatedCurrent,
    forecast: ForecastPayload,
    air_quality: Option<AirQuality>,
) -> Result<WeatherReport, FetchError> {
    let ValidatedCurrent(current) = current;
    let units = query.units();

    let snapshot = WeatherSnapshot {
        coordinates: Coordinates::from(&current.coord),
        condition: primary_condition(&current.weather),
        temperature: current.main.temp,
        feels_like: current.main.feels_like,
        humidity_pct: current.main.humidity,
        wind_speed: current.wind.speed,
        visibility_m: current.visibility,
        sunrise: timestamp(current.sys.sunrise, "sunrise")?,
        sunset: timestamp(current.sys.sunset, "sunset")?,
        observed_at: timestamp(current.dt, "dt")?,
        location_name: current.name,
        country: current.sys.country,
        air_quality,
        units,
    };

    let entries = forecast
        .list
        .iter()
        .map(|item| {
            Ok(ForecastEntry {
                time: timestamp(item.dt, "forecast dt")?,
                temperature: item.main.temp,
                humidity_pct: item.main.humidity,
                wind_speed: item.wind.speed,
                condition: primary_condition(&item.weather),
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(WeatherReport {
        query: query.clone(),
        snapshot,
        forecast: ForecastSeries::new(entries),
    })
}
