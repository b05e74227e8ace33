//! Place-name variants of a geocoded locality.

use realty_geo_geography_models::PlaceComponents;

/// Extracts the locality names of a geocode in preference order:
/// city, town, village, municipality, county, suburb, neighbourhood.
///
/// Values are trimmed; blanks and exact duplicates are dropped, and the
/// order is otherwise preserved.
#[must_use]
pub fn extract_city_variations(components: &PlaceComponents) -> Vec<String> {
    let ordered = [
        &components.city,
        &components.town,
        &components.village,
        &components.municipality,
        &components.county,
        &components.suburb,
        &components.neighbourhood,
    ];

    let mut variants: Vec<String> = Vec::with_capacity(ordered.len());
    for value in ordered {
        let value = value.trim();
        if !value.is_empty() && !variants.iter().any(|v| v == value) {
            variants.push(value.to_string());
        }
    }
    variants
}
