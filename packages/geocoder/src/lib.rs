#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for the reconciliation pipeline.
//!
//! Converts a map coordinate into named address components (reverse
//! geocoding) and a free-form address into a coordinate (forward
//! geocoding). The only provider is Nominatim / `OpenStreetMap`; its
//! endpoints are configured via TOML files in `services/` and loaded by the
//! [`service_registry`].
//!
//! Consumers depend on the [`ReverseGeocoder`] trait so that tests can
//! substitute a stub for the network client.

pub mod nominatim;
pub mod service_registry;

use realty_geo_geography_models::{ForwardGeocodeResult, GeoCoordinate, ReverseGeocodeResult};
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Geocoding failed with HTTP status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider returned an error message in an otherwise valid body.
    #[error("Provider error: {message}")]
    Provider {
        /// Message reported by the provider.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// A geocoding backend.
#[async_trait::async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the address components at `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails, the provider reports
    /// an error, or the response cannot be parsed.
    async fn reverse_geocode(
        &self,
        coordinate: GeoCoordinate,
    ) -> Result<ReverseGeocodeResult, GeocodeError>;

    /// Looks up the coordinate of a free-form address.
    ///
    /// Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails or the response cannot
    /// be parsed.
    async fn forward_geocode(
        &self,
        query: &str,
    ) -> Result<Option<ForwardGeocodeResult>, GeocodeError>;
}
