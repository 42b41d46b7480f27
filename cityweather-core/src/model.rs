use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display convention the provider expresses values in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the provider's `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// A validated search: trimmed, non-empty city text plus the unit system to request.
///
/// Built by [`crate::query::normalize`]; there is no other public constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub(crate) city: String,
    pub(crate) units: UnitSystem,
}

impl SearchQuery {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Same city, different unit system.
    pub fn with_units(&self, units: UnitSystem) -> Self {
        Self {
            city: self.city.clone(),
            units,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn map_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Coarse pollution severity bucket reported by the air-pollution endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirQuality {
    Good = 1,
    Fair = 2,
    Moderate = 3,
    Poor = 4,
    VeryPoor = 5,
}

impl AirQuality {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(AirQuality::Good),
            2 => Some(AirQuality::Fair),
            3 => Some(AirQuality::Moderate),
            4 => Some(AirQuality::Poor),
            5 => Some(AirQuality::VeryPoor),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirQuality::Good => "Good",
            AirQuality::Fair => "Fair",
            AirQuality::Moderate => "Moderate",
            AirQuality::Poor => "Poor",
            AirQuality::VeryPoor => "Very Poor",
        }
    }

    /// Hex colour used for the AQI badge.
    pub fn color(&self) -> &'static str {
        match self {
            AirQuality::Good => "#00e400",
            AirQuality::Fair => "#ffff00",
            AirQuality::Moderate => "#ff7e00",
            AirQuality::Poor => "#ff0000",
            AirQuality::VeryPoor => "#8f3f97",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Temperature bucket used for theming the current-conditions view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub fn classify(temperature: f64, units: UnitSystem) -> Self {
        let (hot, warm, mild) = match units {
            UnitSystem::Metric => (30.0, 20.0, 10.0),
            UnitSystem::Imperial => (86.0, 68.0, 50.0),
        };
        if temperature > hot {
            TemperatureBand::Hot
        } else if temperature > warm {
            TemperatureBand::Warm
        } else if temperature > mild {
            TemperatureBand::Mild
        } else {
            TemperatureBand::Cold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureBand::Hot => "Hot",
            TemperatureBand::Warm => "Warm",
            TemperatureBand::Mild => "Mild",
            TemperatureBand::Cold => "Cold",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TemperatureBand::Hot => "#ff6b6b",
            TemperatureBand::Warm => "#ffd93d",
            TemperatureBand::Mild => "#6bcb77",
            TemperatureBand::Cold => "#4d96ff",
        }
    }
}

/// Merged, unit-tagged current conditions for one completed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    /// Metres, as reported by the provider.
    pub visibility_m: Option<u32>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
    pub condition: Condition,
    /// `None` when the air-pollution call failed or returned nothing usable.
    pub air_quality: Option<AirQuality>,
    pub units: UnitSystem,
}

impl WeatherSnapshot {
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }

    pub fn rounded_feels_like(&self) -> i64 {
        self.feels_like.round() as i64
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility_m.map(|m| f64::from(m) / 1000.0)
    }

    pub fn temperature_band(&self) -> TemperatureBand {
        TemperatureBand::classify(self.temperature, self.units)
    }
}

/// One 3-hour forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub condition: Condition,
}

impl ForecastEntry {
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }
}

/// Points per day at the provider's 3-hour granularity.
pub const ENTRIES_PER_DAY: usize = 8;

/// Chronological 3-hour forecast, 5 days (40 entries) nominal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub(crate) entries: Vec<ForecastEntry>,
}

impl ForecastSeries {
    /// Sorts by timestamp so the series is chronological regardless of payload order.
    pub fn new(mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|e| e.time);
        Self { entries }
    }

    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The next `count` entries.
    pub fn hourly(&self, count: usize) -> &[ForecastEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// One entry per day: every eighth point starting from the first.
    pub fn daily(&self) -> Vec<&ForecastEntry> {
        self.entries.iter().step_by(ENTRIES_PER_DAY).collect()
    }
}

/// The result of a successful primary search.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub query: SearchQuery,
    pub snapshot: WeatherSnapshot,
    pub forecast: ForecastSeries,
}

impl WeatherReport {
    pub fn units(&self) -> UnitSystem {
        self.snapshot.units
    }
}

/// Reduced view used by the side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSnapshot {
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub units: UnitSystem,
}

impl CompareSnapshot {
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }

    pub fn rounded_feels_like(&self) -> i64 {
        self.feels_like.round() as i64
    }
}
