//! Nearest-city lookup by coordinates.
//!
//! Used as the fallback when no geocoded name matches a known city.

use realty_geo_geography_models::CityRecord;

use crate::distance::distance_km;

/// Default search radius for [`find_nearest_city`].
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// A usable coordinate component: present, finite, and non-zero.
///
/// Zero is treated as "unset"; the reference data uses `0` as a
/// placeholder for unknown coordinates.
fn usable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Finds the nearest city within `max_distance_km` of `(lat, lng)`.
///
/// Returns `None` if the query coordinate is unusable (zero or
/// non-finite), if no candidate has coordinates, or if every candidate is
/// farther than the bound. Candidates missing either coordinate are
/// skipped. Ties go to the earlier candidate.
#[must_use]
pub fn find_nearest_city(
    lat: f64,
    lng: f64,
    cities: &[CityRecord],
    max_distance_km: f64,
) -> Option<&CityRecord> {
    find_nearest_city_with_distance(lat, lng, cities, max_distance_km).map(|(city, _)| city)
}

/// Like [`find_nearest_city`], but also returns the distance in km.
#[must_use]
pub fn find_nearest_city_with_distance(
    lat: f64,
    lng: f64,
    cities: &[CityRecord],
    max_distance_km: f64,
) -> Option<(&CityRecord, f64)> {
    if !usable(lat) || !usable(lng) || cities.is_empty() {
        return None;
    }

    let mut nearest: Option<(&CityRecord, f64)> = None;
    let mut min_distance = f64::INFINITY;

    for city in cities {
        let (Some(city_lat), Some(city_lng)) = (city.latitude, city.longitude) else {
            continue;
        };
        if !usable(city_lat) || !usable(city_lng) {
            continue;
        }

        let distance = distance_km(lat, lng, city_lat, city_lng);
        if distance < min_distance && distance <= max_distance_km {
            min_distance = distance;
            nearest = Some((city, distance));
        }
    }

    match nearest {
        Some((city, distance)) => log::debug!(
            "Nearest city to ({lat}, {lng}): {:?} (id={}) at {distance:.2} km",
            city.name,
            city.id
        ),
        None => log::debug!(
            "No city within {max_distance_km} km of ({lat}, {lng}) among {} candidates",
            cities.len()
        ),
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn florida() -> Vec<CityRecord> {
        vec![
            CityRecord::named(1, "Miami").at(25.76, -80.19),
            CityRecord::named(2, "Orlando").at(28.54, -81.38),
        ]
    }

    #[test]
    fn picks_city_within_bound() {
        let list = florida();
        let city = find_nearest_city(25.7617, -80.1918, &list, 50.0).unwrap();
        assert_eq!(city.name, "Miami");
    }

    #[test]
    fn excludes_cities_beyond_bound() {
        let list = vec![CityRecord::named(2, "Orlando").at(28.54, -81.38)];
        assert!(find_nearest_city(25.7617, -80.1918, &list, 50.0).is_none());
    }

    #[test]
    fn zero_query_coordinate_is_unavailable() {
        let list = vec![CityRecord::named(1, "Faraway").at(45.0, 45.0)];
        assert!(find_nearest_city(0.0, 0.0, &list, 50.0).is_none());
        // Even with an unbounded radius.
        assert!(find_nearest_city(0.0, 10.0, &list, f64::INFINITY).is_none());
    }

    #[test]
    fn non_finite_query_is_unavailable() {
        assert!(find_nearest_city(f64::NAN, -80.19, &florida(), 50.0).is_none());
    }

    #[test]
    fn skips_candidates_without_coordinates() {
        let list = vec![
            CityRecord::named(1, "Unknown"),
            CityRecord {
                longitude: None,
                ..CityRecord::named(2, "Half").at(25.76, -80.19)
            },
            CityRecord::named(3, "Miami").at(25.77, -80.20),
        ];
        let city = find_nearest_city(25.7617, -80.1918, &list, 50.0).unwrap();
        assert_eq!(city.id, 3);
    }

    #[test]
    fn picks_the_closest_of_several() {
        let list = vec![
            CityRecord::named(1, "Hialeah").at(25.8576, -80.2781),
            CityRecord::named(2, "Miami").at(25.7617, -80.1918),
            CityRecord::named(3, "Coral Gables").at(25.7215, -80.2684),
        ];
        let (city, distance) =
            find_nearest_city_with_distance(25.7617, -80.1918, &list, 50.0).unwrap();
        assert_eq!(city.id, 2);
        assert!(distance.abs() < 1e-9);
    }

    #[test]
    fn first_candidate_wins_ties() {
        // Equidistant east and west of the query point.
        let list = vec![
            CityRecord::named(1, "West").at(10.0, 9.0),
            CityRecord::named(2, "East").at(10.0, 11.0),
        ];
        assert_eq!(find_nearest_city(10.0, 10.0, &list, 500.0).unwrap().id, 1);

        let reversed: Vec<CityRecord> = list.into_iter().rev().collect();
        assert_eq!(find_nearest_city(10.0, 10.0, &reversed, 500.0).unwrap().id, 2);
    }

    #[test]
    fn bound_is_inclusive() {
        let list = florida();
        let (_, d) = find_nearest_city_with_distance(25.7617, -80.1918, &list, 50.0).unwrap();
        assert!(find_nearest_city(25.7617, -80.1918, &list, d).is_some());
        assert!(find_nearest_city(25.7617, -80.1918, &list, d * 0.5).is_none());
    }

    #[test]
    fn empty_candidates_yield_none() {
        assert!(find_nearest_city(25.7617, -80.1918, &[], 50.0).is_none());
    }
}
