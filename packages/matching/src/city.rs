//! City-name matching cascade.
//!
//! A geocoder usually returns several names for one point (city, town,
//! county, suburb, ...). Each name is tried against every candidate city
//! in four stages of decreasing strictness:
//!
//! 1. [`MatchTier::Exact`]: normalized names are equal
//! 2. [`MatchTier::Substring`]: one normalized name contains the other
//! 3. [`MatchTier::FuzzyHigh`]: edit-distance similarity ≥ 0.8
//! 4. [`MatchTier::FuzzyLow`]: edit-distance similarity ≥ 0.6
//!
//! Stages are exhausted across *all* names before moving on, so an exact
//! match on a later name beats a fuzzy match on the first one. Within a
//! stage, names are tried in the given order and candidates in list order.

use realty_geo_geography_models::{CityRecord, MatchTier};

use crate::normalize::normalize;
use crate::similarity::{
    FUZZY_HIGH_THRESHOLD, FUZZY_LOW_THRESHOLD, are_similar_normalized, similarity,
};

/// One or more place-name variants, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameQuery(Vec<String>);

impl NameQuery {
    /// The variants in preference order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if there are no variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for NameQuery {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for NameQuery {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for NameQuery {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[String]> for NameQuery {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

impl From<&[&str]> for NameQuery {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for NameQuery {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(ToString::to_string).collect())
    }
}

/// Decides whether a normalized variant matches a normalized city name.
type StagePredicate = fn(&str, &str) -> bool;

fn exact(variant: &str, city: &str) -> bool {
    variant == city
}

fn substring(variant: &str, city: &str) -> bool {
    city.contains(variant) || variant.contains(city)
}

fn fuzzy_high(variant: &str, city: &str) -> bool {
    are_similar_normalized(city, variant, FUZZY_HIGH_THRESHOLD)
}

fn fuzzy_low(variant: &str, city: &str) -> bool {
    are_similar_normalized(city, variant, FUZZY_LOW_THRESHOLD)
}

/// The cascade, in precedence order.
const STAGES: &[(MatchTier, StagePredicate)] = &[
    (MatchTier::Exact, exact),
    (MatchTier::Substring, substring),
    (MatchTier::FuzzyHigh, fuzzy_high),
    (MatchTier::FuzzyLow, fuzzy_low),
];

/// Finds the best-matching city for one or more geocoded name variants.
///
/// Returns `None` if there are no names, no candidates, or no stage
/// matches. The candidate list is never modified.
#[must_use]
pub fn find_best_matching_city<'c>(
    names: impl Into<NameQuery>,
    cities: &'c [CityRecord],
) -> Option<&'c CityRecord> {
    find_best_matching_city_with_tier(names, cities).map(|(city, _)| city)
}

/// Like [`find_best_matching_city`], but also reports which stage matched.
#[must_use]
pub fn find_best_matching_city_with_tier<'c>(
    names: impl Into<NameQuery>,
    cities: &'c [CityRecord],
) -> Option<(&'c CityRecord, MatchTier)> {
    let query = names.into();
    if query.is_empty() || cities.is_empty() {
        return None;
    }

    // Names that normalize to nothing would satisfy the substring stage
    // against every candidate.
    let variants: Vec<String> = query
        .variants()
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect();
    if variants.is_empty() {
        return None;
    }

    let candidates: Vec<(&CityRecord, String)> = cities
        .iter()
        .map(|c| (c, normalize(&c.name)))
        .filter(|(_, n)| !n.is_empty())
        .collect();

    for &(tier, matches) in STAGES {
        for variant in &variants {
            if let Some((city, _)) = candidates.iter().find(|(_, name)| matches(variant, name)) {
                log::debug!(
                    "City match: {variant:?} -> {:?} (id={}, tier={tier}, similarity={:.2})",
                    city.name,
                    city.id,
                    similarity(variant, &city.name)
                );
                return Some((city, tier));
            }
        }
    }

    log::debug!(
        "No city match for {:?} among {} candidates",
        query.variants(),
        cities.len()
    );
    None
}
