//! The reconciliation entry point.

use realty_geo_geography_models::{
    CityMatch, CoordinateError, CountryRecord, GeoCoordinate, LookupTier, MatchTier,
    PlaceComponents, ReconciledLocation, ResolutionStage, ReverseGeocodeResult, StateRecord,
    TierFailure,
};
use realty_geo_matching::{
    DEFAULT_MAX_DISTANCE_KM, find_best_matching_city_with_tier, find_nearest_city_with_distance,
};
use realty_geo_reference::{ReferenceDataProvider, ReferenceError};
use thiserror::Error;

use crate::cache::ReferenceCache;
use crate::hierarchy::{match_country, match_state};
use crate::variants::extract_city_variations;

/// Errors from [`GeoReconciler`].
///
/// Lookup failures and missing matches are not errors; they leave the
/// affected tier unresolved.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The caller supplied a coordinate outside the WGS84 range.
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

impl From<CoordinateError> for ReconcileError {
    fn from(e: CoordinateError) -> Self {
        Self::InvalidCoordinate {
            latitude: e.latitude,
            longitude: e.longitude,
        }
    }
}

/// Tunables for [`GeoReconciler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileOptions {
    /// Search radius of the nearest-city fallback.
    pub max_distance_km: f64,
    /// Whether to fall back to the nearest city when no name matches.
    pub coordinate_fallback: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            coordinate_fallback: true,
        }
    }
}

/// Inputs of one reconciliation run.
struct Query<'a> {
    components: &'a PlaceComponents,
    variants: Vec<String>,
    coordinate: Option<GeoCoordinate>,
}

/// Resolves geocoded places against a reference-data provider, caching the
/// fetched lists between calls.
pub struct GeoReconciler<P> {
    provider: P,
    cache: ReferenceCache,
    options: ReconcileOptions,
}

impl<P: ReferenceDataProvider> GeoReconciler<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, ReconcileOptions::default())
    }

    #[must_use]
    pub fn with_options(provider: P, options: ReconcileOptions) -> Self {
        Self {
            provider,
            cache: ReferenceCache::new(),
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub const fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Forgets every cached reference list.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Reconciles a reverse-geocode result, using its coordinate for the
    /// nearest-city fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidCoordinate`] if the result carries
    /// an out-of-range coordinate.
    pub async fn reconcile(
        &mut self,
        geocode: &ReverseGeocodeResult,
    ) -> Result<ReconciledLocation, ReconcileError> {
        self.reconcile_components(&geocode.components, geocode.coordinate)
            .await
    }

    /// Reconciles bare address components with an optional coordinate.
    ///
    /// Tiers resolve in order (country, state, city). Resolution stops at
    /// the first tier that does not match or whose lookup fails; the
    /// failure is logged and recorded in
    /// [`ReconciledLocation::failures`].
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidCoordinate`] if `coordinate` is out
    /// of range or non-finite.
    pub async fn reconcile_components(
        &mut self,
        components: &PlaceComponents,
        coordinate: Option<GeoCoordinate>,
    ) -> Result<ReconciledLocation, ReconcileError> {
        // Struct literals and deserialization bypass `GeoCoordinate::new`.
        if let Some(c) = coordinate {
            GeoCoordinate::new(c.latitude, c.longitude)?;
        }

        let query = Query {
            components,
            variants: extract_city_variations(components),
            coordinate,
        };
        let mut location = ReconciledLocation::default();

        while let Some(next) = self.advance(&query, &mut location).await {
            location.stage = next;
        }

        log::info!(
            "Reconciled to {} (country={:?}, state={:?}, city={:?})",
            location.stage,
            location.country.as_ref().map(|c| &c.name),
            location.state.as_ref().map(|s| &s.name),
            location.city.as_ref().map(|m| (&m.city.name, m.tier)),
        );

        Ok(location)
    }

    /// Attempts the tier after `location.stage`. Returns the new stage if
    /// it resolved.
    async fn advance(
        &mut self,
        query: &Query<'_>,
        location: &mut ReconciledLocation,
    ) -> Option<ResolutionStage> {
        match location.stage {
            ResolutionStage::Unresolved => {
                let country = self.resolve_country(query, location).await?;
                self.cache.select_country(country.id);
                location.country = Some(country);
                Some(ResolutionStage::CountryResolved)
            }
            ResolutionStage::CountryResolved => {
                let country_id = location.country.as_ref()?.id;
                let state = self.resolve_state(query, country_id, location).await?;
                self.cache.select_state(state.id);
                location.state = Some(state);
                Some(ResolutionStage::StateResolved)
            }
            ResolutionStage::StateResolved => {
                let state_id = location.state.as_ref()?.id;
                location.city = Some(self.resolve_city(query, state_id, location).await?);
                Some(ResolutionStage::CityResolved)
            }
            ResolutionStage::CityResolved => None,
        }
    }

    async fn resolve_country(
        &mut self,
        query: &Query<'_>,
        location: &mut ReconciledLocation,
    ) -> Option<CountryRecord> {
        let components = query.components;
        if components.country_code.trim().is_empty() && components.country.trim().is_empty() {
            log::debug!("Geocode has no country; skipping country lookup");
            return None;
        }

        let countries = match self.cache.countries(&self.provider).await {
            Ok(countries) => countries,
            Err(e) => {
                record_failure(location, LookupTier::Countries, &e);
                return None;
            }
        };

        let matched = match_country(components, countries).cloned();
        match &matched {
            Some(c) => log::debug!(
                "Country {:?}/{:?} -> {} (id={})",
                components.country_code,
                components.country,
                c.name,
                c.id
            ),
            None => log::debug!(
                "No country matches {:?} / {:?} among {}",
                components.country_code,
                components.country,
                countries.len()
            ),
        }
        matched
    }

    async fn resolve_state(
        &mut self,
        query: &Query<'_>,
        country_id: i64,
        location: &mut ReconciledLocation,
    ) -> Option<StateRecord> {
        let state_name = &query.components.state;

        let states = match self.cache.states(&self.provider, country_id).await {
            Ok(states) => states,
            Err(e) => {
                record_failure(location, LookupTier::States, &e);
                return None;
            }
        };

        let matched = match_state(state_name, states).cloned();
        match &matched {
            Some(s) => log::debug!("State {state_name:?} -> {} (id={})", s.name, s.id),
            None => log::debug!(
                "No state matches {state_name:?} among {} in country {country_id}",
                states.len()
            ),
        }
        matched
    }

    async fn resolve_city(
        &mut self,
        query: &Query<'_>,
        state_id: i64,
        location: &mut ReconciledLocation,
    ) -> Option<CityMatch> {
        let cities = match self.cache.cities(&self.provider, state_id).await {
            Ok(cities) => cities,
            Err(e) => {
                record_failure(location, LookupTier::Cities, &e);
                return None;
            }
        };

        let by_name = find_best_matching_city_with_tier(query.variants.as_slice(), cities);
        if let Some((city, tier)) = by_name {
            return Some(CityMatch {
                city: city.clone(),
                tier,
                distance_km: None,
            });
        }

        if !self.options.coordinate_fallback {
            return None;
        }
        let coordinate = query.coordinate?;
        let (city, distance) = find_nearest_city_with_distance(
            coordinate.latitude,
            coordinate.longitude,
            cities,
            self.options.max_distance_km,
        )?;
        log::debug!(
            "No name match for {:?}; nearest city is {} at {distance:.2} km",
            query.variants,
            city.name
        );
        Some(CityMatch {
            city: city.clone(),
            tier: MatchTier::CoordinateNearest,
            distance_km: Some(distance),
        })
    }
}

fn record_failure(location: &mut ReconciledLocation, tier: LookupTier, error: &ReferenceError) {
    log::warn!("{tier} lookup failed: {error}");
    location.failures.push(TierFailure {
        tier,
        message: error.to_string(),
    });
}
