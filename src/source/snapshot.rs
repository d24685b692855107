//! Wire types for the sensor API.
//!
//! These types match the JSON returned by `GET /api/sensors/formatted`:
//!
//! ```json
//! { "success": true, "sensors": [ { "code": "temp_current", "name": "Temperatura", "value": 22.5, "unit": "°C" } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// The ordered list of readings returned by one successful poll.
pub type SensorSnapshot = Vec<SensorReading>;

/// A reading value as sent by the API.
///
/// Most sensors report numbers; a few report booleans (charge state) or
/// enum-like strings (air quality index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum SensorValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Missing,
    /// Anything else the API might send (objects, arrays).
    Other(serde_json::Value),
}

impl SensorValue {
    /// Returns the value if it is a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SensorValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SensorValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce the value into a history sample.
    ///
    /// Numbers pass through, booleans map to 1.0/0.0, everything else
    /// yields `None`.
    pub fn as_sample(&self) -> Option<f64> {
        match self {
            SensorValue::Bool(true) => Some(1.0),
            SensorValue::Bool(false) => Some(0.0),
            other => other.as_number(),
        }
    }
}

/// One sensor reading within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SensorReading {
    /// Stable identifier such as `co2_value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Display label, also the fallback identity when `code` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub value: SensorValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl SensorReading {
    /// Create a reading with a code and value, used heavily in tests.
    pub fn new(code: &str, value: SensorValue) -> Self {
        Self {
            code: Some(code.to_string()),
            name: None,
            value,
            unit: None,
        }
    }

    /// The identity key used to correlate readings across polls.
    ///
    /// `code` when present and non-empty, else `name`. Readings with
    /// neither have no key.
    pub fn key(&self) -> Option<&str> {
        non_empty(self.code.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// The sensor code, or an empty string when absent.
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// The envelope around a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensorsResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub sensors: Option<Vec<SensorReading>>,
}

impl SensorsResponse {
    /// Validate the envelope and extract the snapshot.
    ///
    /// Anything other than `success: true` with a `sensors` list is a
    /// payload error.
    pub fn into_snapshot(self) -> Result<SensorSnapshot, FetchError> {
        if self.success != Some(true) {
            return Err(FetchError::Payload(
                "No se encontraron datos de sensores".to_string(),
            ));
        }
        self.sensors
            .ok_or_else(|| FetchError::Payload("response has no sensor list".to_string()))
    }

    /// Parse a raw body and validate it in one step.
    pub fn parse(body: &str) -> Result<SensorSnapshot, FetchError> {
        serde_json::from_str::<SensorsResponse>(body)?.into_snapshot()
    }
}
