//! Outcome types for reconciling a geocoded place with reference data.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{CityRecord, CountryRecord, StateRecord};

/// How a city was chosen, in order of precedence.
///
/// The ordering of the variants is the precedence of the matching
/// cascade: an earlier tier always beats a later one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchTier {
    /// Normalized names are equal.
    Exact,
    /// One normalized name contains the other.
    Substring,
    /// Edit-distance similarity at or above the high threshold.
    FuzzyHigh,
    /// Edit-distance similarity at or above the low threshold.
    FuzzyLow,
    /// No name matched; the nearest city within range was taken.
    CoordinateNearest,
}

/// A selected city together with the tier that selected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMatch {
    pub city: CityRecord,
    pub tier: MatchTier,
    /// Great-circle distance from the query point, for
    /// [`MatchTier::CoordinateNearest`] matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Progress through the country → state → city chain.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStage {
    #[default]
    Unresolved,
    CountryResolved,
    StateResolved,
    CityResolved,
}

/// A reference-data lookup that can fail independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupTier {
    Countries,
    States,
    Cities,
}

/// A lookup that failed during reconciliation. The tier it feeds is left
/// unresolved; tiers above it are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierFailure {
    pub tier: LookupTier,
    pub message: String,
}

/// The resolved subset of the administrative hierarchy.
///
/// Partial results are normal: a state may resolve while its city does
/// not. Callers should let users fill in whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledLocation {
    pub country: Option<CountryRecord>,
    pub state: Option<StateRecord>,
    pub city: Option<CityMatch>,
    pub stage: ResolutionStage,
    /// Lookups that failed along the way.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TierFailure>,
}

impl ReconciledLocation {
    /// Returns `true` when country, state, and city all resolved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.stage, ResolutionStage::CityResolved)
    }

    /// Returns the names of the tiers that did not resolve, for prompting
    /// manual entry.
    #[must_use]
    pub fn unresolved_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.country.is_none() {
            fields.push("country");
        }
        if self.state.is_none() {
            fields.push("state");
        }
        if self.city.is_none() {
            fields.push("city");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_by_precedence() {
        assert!(MatchTier::Exact < MatchTier::Substring);
        assert!(MatchTier::Substring < MatchTier::FuzzyHigh);
        assert!(MatchTier::FuzzyHigh < MatchTier::FuzzyLow);
        assert!(MatchTier::FuzzyLow < MatchTier::CoordinateNearest);
    }

    #[test]
    fn tier_display_is_snake_case() {
        assert_eq!(MatchTier::FuzzyHigh.to_string(), "fuzzy_high");
        assert_eq!(
            "coordinate_nearest".parse::<MatchTier>().unwrap(),
            MatchTier::CoordinateNearest
        );
    }

    #[test]
    fn empty_location_reports_every_field() {
        let loc = ReconciledLocation::default();
        assert_eq!(loc.stage, ResolutionStage::Unresolved);
        assert!(!loc.is_complete());
        assert_eq!(loc.unresolved_fields(), vec!["country", "state", "city"]);
    }

    #[test]
    fn partial_location_reports_city_only() {
        let loc = ReconciledLocation {
            country: Some(CountryRecord {
                id: 1,
                name: "United States".to_string(),
                iso2: Some("US".to_string()),
                iso3: None,
            }),
            state: Some(StateRecord {
                id: 2,
                name: "Florida".to_string(),
                state_code: Some("FL".to_string()),
                country_id: Some(1),
            }),
            city: None,
            stage: ResolutionStage::StateResolved,
            failures: Vec::new(),
        };
        assert_eq!(loc.unresolved_fields(), vec!["city"]);
    }
}
