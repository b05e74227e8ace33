#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City matching for geocoded places.
//!
//! Reconciles a reverse-geocoded place name with a list of known cities
//! from the reference database:
//!
//! 1. **Name matching** ([`city`]): a four-stage cascade (exact →
//!    substring → fuzzy high → fuzzy low) over every name variant the
//!    geocoder produced.
//! 2. **Coordinate matching** ([`nearest`]): when no name matches, the
//!    nearest city by great-circle distance ([`distance`]) within a bound.
//!
//! Everything here is synchronous, allocation-light, and free of shared
//! state. Candidate lists are borrowed and never modified; matches are
//! returned as references into them.

pub mod city;
pub mod distance;
pub mod nearest;
pub mod normalize;
pub mod similarity;

pub use city::{NameQuery, find_best_matching_city, find_best_matching_city_with_tier};
pub use distance::distance_km;
pub use nearest::{DEFAULT_MAX_DISTANCE_KM, find_nearest_city, find_nearest_city_with_distance};
pub use normalize::normalize;
pub use similarity::{are_similar, levenshtein, similarity};
