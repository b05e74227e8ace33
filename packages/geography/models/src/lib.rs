#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reference and reconciliation types.
//!
//! These types describe the country → state → city administrative
//! hierarchy served by the CRM backend, the place-name components returned
//! by reverse geocoding, and the (possibly partial) result of reconciling
//! one with the other. They carry no behaviour beyond validation and
//! lenient deserialization; matching lives in `realty_geo_matching`.

pub mod place;
pub mod reference;
pub mod resolution;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use place::{ForwardGeocodeResult, PlaceComponents, ReverseGeocodeResult};
pub use reference::{CityRecord, CountryRecord, StateRecord};
pub use resolution::{
    CityMatch, LookupTier, MatchTier, ReconciledLocation, ResolutionStage, TierFailure,
};

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCoordinate {
    /// Latitude in degrees, `-90..=90`.
    pub latitude: f64,
    /// Longitude in degrees, `-180..=180`.
    pub longitude: f64,
}

/// Error returned when a coordinate is outside the valid WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinate ({latitude}, {longitude}): expected lat -90..90, lon -180..180")]
pub struct CoordinateError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is non-finite or out
    /// of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
        {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoordinateError {
                latitude,
                longitude,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_coordinate() {
        let c = GeoCoordinate::new(25.7617, -80.1918).unwrap();
        assert!((c.latitude - 25.7617).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(GeoCoordinate::new(90.0, 180.0).is_ok());
        assert!(GeoCoordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = GeoCoordinate::new(91.0, 0.0).unwrap_err();
        assert!((err.latitude - 91.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoCoordinate::new(f64::NAN, 10.0).is_err());
        assert!(GeoCoordinate::new(10.0, f64::INFINITY).is_err());
    }
}
