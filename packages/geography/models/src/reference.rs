//! Read-only reference records served by the CRM backend.
//!
//! The backend is not consistent about numeric encoding: city coordinates
//! arrive as JSON numbers, numeric strings, or `null` depending on the
//! endpoint. [`lenient_f64`] accepts all three.

use serde::{Deserialize, Deserializer, Serialize};

/// A country row from the geographic reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Backend identifier.
    pub id: i64,
    /// Display name (e.g. "United States").
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    /// ISO 3166-1 alpha-2 code (e.g. "US").
    #[serde(default)]
    pub iso2: Option<String>,
    /// ISO 3166-1 alpha-3 code (e.g. "USA").
    #[serde(default)]
    pub iso3: Option<String>,
}

/// A state / province / region row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    /// Short code (e.g. "FL").
    #[serde(default)]
    pub state_code: Option<String>,
    /// Owning country.
    #[serde(default, alias = "country")]
    pub country_id: Option<i64>,
}

/// A city row. Coordinates are optional; cities without both are not
/// eligible for nearest-city resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    /// Owning state.
    #[serde(default, alias = "state")]
    pub state_id: Option<i64>,
}

impl CityRecord {
    /// Creates a city without coordinates.
    #[must_use]
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: None,
            longitude: None,
            state_id: None,
        }
    }

    /// Sets the city's coordinates.
    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// Deserializes an optional float that may be encoded as a number, a
/// numeric string, or `null`. Unparseable strings become `None`.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither a number, a
/// string, nor `null`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawNumber::Number(n)) => Some(n),
        Some(RawNumber::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    }
    .filter(|n| n.is_finite()))
}

/// Deserializes a string that the backend may send as `null`.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither a string nor
/// `null`.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
