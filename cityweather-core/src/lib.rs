//! Core library for the `cityweather` lookup.
//!
//! This crate defines:
//! - Query normalization and the classified error taxonomy
//! - The fetch pipeline combining current weather, forecast and air quality
//! - The persisted recent-city list
//! - Application state, its reducer, and a session that runs effects
//! - Configuration & credentials handling
//!
//! It is used by `cityweather-cli`, but any other front end can drive a [`Session`].

pub mod aggregator;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;
pub mod query;
pub mod session;
pub mod state;

pub use aggregator::Aggregator;
pub use config::Config;
pub use error::FetchError;
pub use history::RecentCityStore;
pub use model::{
    AirQuality, CompareSnapshot, Condition, Coordinates, ForecastEntry, ForecastSeries,
    SearchQuery, TemperatureBand, UnitSystem, WeatherReport, WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use query::normalize;
pub use session::Session;
pub use state::{Action, AppState, CompareState, Effect, Tab, reduce};
