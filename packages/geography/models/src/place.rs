//! Place-name records produced by geocoding providers.

use serde::{Deserialize, Serialize};

use crate::GeoCoordinate;

/// Address components of a geocoded point.
///
/// Every field is an empty string when the provider did not return it.
/// Several fields describe the same locality at different granularities
/// (`city`, `town`, `village`, ...); they are all kept so that city
/// matching can try each spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceComponents {
    /// Primary locality. Providers fill this from `city`, falling back to
    /// `town` then `village`.
    pub city: String,
    pub town: String,
    pub village: String,
    pub municipality: String,
    pub county: String,
    pub suburb: String,
    pub neighbourhood: String,
    /// State or region name.
    pub state: String,
    pub country: String,
    /// Upper-cased ISO 3166-1 alpha-2 code.
    pub country_code: String,
    pub postcode: String,
    pub street: String,
    pub house_number: String,
}

/// Result of a reverse geocode (coordinates → place).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeResult {
    /// Full human-readable address from the provider.
    pub display_name: Option<String>,
    pub components: PlaceComponents,
    /// The coordinate the provider snapped the query to, if it returned one.
    pub coordinate: Option<GeoCoordinate>,
}

/// Result of a forward geocode (free-form address → coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardGeocodeResult {
    pub display_name: Option<String>,
    pub coordinate: GeoCoordinate,
    pub components: PlaceComponents,
}
