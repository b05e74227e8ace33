//! Country and state matching.

use realty_geo_geography_models::{CountryRecord, PlaceComponents, StateRecord};
use realty_geo_matching::normalize;

/// Finds the country of a geocode.
///
/// Returns the first country in list order whose ISO alpha-2 code equals
/// the geocode's `country_code` (case-insensitive) or whose normalized name
/// equals the normalized `country`.
#[must_use]
pub fn match_country<'a>(
    components: &PlaceComponents,
    countries: &'a [CountryRecord],
) -> Option<&'a CountryRecord> {
    let code = components.country_code.trim();
    let name = normalize(&components.country);

    countries.iter().find(|c| {
        let code_matches = !code.is_empty()
            && c.iso2
                .as_deref()
                .is_some_and(|iso| iso.trim().eq_ignore_ascii_case(code));
        code_matches || (!name.is_empty() && normalize(&c.name) == name)
    })
}

/// Finds the state named `state_name` in `states`.
///
/// Returns the first state in list order whose name contains
/// `state_name`, or is contained in it, case-insensitively. States with
/// blank names never match.
#[must_use]
pub fn match_state<'a>(state_name: &str, states: &'a [StateRecord]) -> Option<&'a StateRecord> {
    let needle = state_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    states.iter().find(|s| {
        let name = s.name.trim().to_lowercase();
        !name.is_empty() && (name.contains(&needle) || needle.contains(name.as_str()))
    })
}
