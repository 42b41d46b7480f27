//! Wire shapes of the provider's three endpoints.
//!
//! Only the fields the snapshot needs are declared; everything else in the
//! JSON is ignored.

use serde::Deserialize;

use crate::model::{Condition, Coordinates};

/// The provider's own status field. `/weather` sends a number, `/forecast` a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProviderStatus {
    Code(u16),
    Text(String),
}

impl ProviderStatus {
    pub const SUCCESS: u16 = 200;

    pub fn code(&self) -> Option<u16> {
        match self {
            ProviderStatus::Code(c) => Some(*c),
            ProviderStatus::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code() == Some(Self::SUCCESS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordPayload {
    pub lat: f64,
    pub lon: f64,
}

impl From<&CoordPayload> for Coordinates {
    fn from(c: &CoordPayload) -> Self {
        Coordinates { lat: c.lat, lon: c.lon }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionPayload {
    pub id: u32,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl From<&ConditionPayload> for Condition {
    fn from(c: &ConditionPayload) -> Self {
        Condition {
            code: c.id,
            main: c.main.clone(),
            description: c.description.clone(),
            icon: c.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainPayload {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindPayload {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SysPayload {
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// `GET /weather` with only its status fields decoded.
///
/// The provider can answer HTTP 200 with an error body such as
/// `{"cod":"500","message":"internal error"}`, so the status is read before the
/// weather fields are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentEnvelope {
    pub cod: Option<ProviderStatus>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl CurrentEnvelope {
    /// The provider's `message`, when it is a non-blank string.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.trim().is_empty())
    }

    /// Decode the weather fields. Only meaningful once `cod` is success.
    pub fn into_payload(self) -> Result<CurrentPayload, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.rest))
    }
}

/// Weather fields of a successful `GET /weather`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub coord: CoordPayload,
    pub dt: i64,
    pub main: MainPayload,
    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
    pub wind: WindPayload,
    pub visibility: Option<u32>,
    pub sys: SysPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastItemPayload {
    pub dt: i64,
    pub main: MainPayload,
    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
    pub wind: WindPayload,
}

/// `GET /forecast`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastPayload {
    pub cod: Option<ProviderStatus>,
    #[serde(default)]
    pub list: Vec<ForecastItemPayload>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AqiPayload {
    pub aqi: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirPollutionItemPayload {
    pub main: AqiPayload,
}

/// `GET /air_pollution`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirPollutionPayload {
    #[serde(default)]
    pub list: Vec<AirPollutionItemPayload>,
}

/// First condition of a payload's `weather` array, or a placeholder when absent.
pub(crate) fn primary_condition(weather: &[ConditionPayload]) -> Condition {
    weather.first().map(Condition::from).unwrap_or_else(|| Condition {
        code: 0,
        main: "Unknown".to_string(),
        description: "Unknown".to_string(),
        icon: String::new(),
    })
}
