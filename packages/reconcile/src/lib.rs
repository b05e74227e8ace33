#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reconciliation.
//!
//! Takes the address components of a reverse-geocoded point and resolves
//! them, tier by tier, against the backend's country → state → city
//! reference data:
//!
//! 1. The country is matched by ISO code or name.
//! 2. The state is matched by name within that country.
//! 3. The city is matched by the name cascade in `realty_geo_matching`,
//!    falling back to the nearest city within range of the coordinate.
//!
//! Each tier's reference list is fetched lazily through a
//! [`ReferenceDataProvider`](realty_geo_reference::ReferenceDataProvider)
//! and kept in a [`ReferenceCache`]. A failed lookup stops only its own
//! tier; whatever resolved above it is returned.

pub mod cache;
pub mod facade;
pub mod hierarchy;
pub mod variants;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ReferenceCache;
pub use facade::{GeoReconciler, ReconcileError, ReconcileOptions};
pub use hierarchy::{match_country, match_state};
pub use variants::extract_city_variations;
