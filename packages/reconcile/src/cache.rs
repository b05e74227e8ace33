//! Reference-data cache keyed by parent id.
//!
//! Holds the country list, the state lists of countries, and the city
//! lists of states that have been fetched so far. Selecting a country or
//! state drops lists that no longer belong to the current selection, so
//! the cache only ever holds one branch of the hierarchy plus the country
//! list. Failed lookups are never cached.

use std::collections::BTreeMap;

use realty_geo_geography_models::{CityRecord, CountryRecord, StateRecord};
use realty_geo_reference::{ReferenceDataProvider, ReferenceError};

/// Lazily filled reference lists.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    countries: Option<Vec<CountryRecord>>,
    states: BTreeMap<i64, Vec<StateRecord>>,
    cities: BTreeMap<i64, Vec<CityRecord>>,
    selected_country: Option<i64>,
    selected_state: Option<i64>,
}

impl ReferenceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the country list, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the fetch fails.
    pub async fn countries<P>(&mut self, provider: &P) -> Result<&[CountryRecord], ReferenceError>
    where
        P: ReferenceDataProvider + ?Sized,
    {
        if self.countries.is_none() {
            let fetched = provider.countries(None).await?;
            log::debug!("Cached {} countries", fetched.len());
            self.countries = Some(fetched);
        } else {
            log::debug!("Country list cache hit");
        }
        Ok(self.countries.as_deref().unwrap_or_default())
    }

    /// Returns the states of `country_id`, fetching them on first use.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the fetch fails.
    pub async fn states<P>(
        &mut self,
        provider: &P,
        country_id: i64,
    ) -> Result<&[StateRecord], ReferenceError>
    where
        P: ReferenceDataProvider + ?Sized,
    {
        if self.states.contains_key(&country_id) {
            log::debug!("State list cache hit for country {country_id}");
        } else {
            let fetched = provider.states_by_country(country_id).await?;
            log::debug!("Cached {} states for country {country_id}", fetched.len());
            self.states.insert(country_id, fetched);
        }
        Ok(self.states.get(&country_id).map(Vec::as_slice).unwrap_or_default())
    }

    /// Returns the cities of `state_id`, fetching them on first use.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the fetch fails.
    pub async fn cities<P>(
        &mut self,
        provider: &P,
        state_id: i64,
    ) -> Result<&[CityRecord], ReferenceError>
    where
        P: ReferenceDataProvider + ?Sized,
    {
        if self.cities.contains_key(&state_id) {
            log::debug!("City list cache hit for state {state_id}");
        } else {
            let fetched = provider.cities_by_state(state_id).await?;
            log::debug!("Cached {} cities for state {state_id}", fetched.len());
            self.cities.insert(state_id, fetched);
        }
        Ok(self.cities.get(&state_id).map(Vec::as_slice).unwrap_or_default())
    }

    /// Marks `country_id` as the current country.
    ///
    /// Changing the country drops the state lists of every other country,
    /// all city lists, and the state selection.
    pub fn select_country(&mut self, country_id: i64) {
        if self.selected_country == Some(country_id) {
            return;
        }
        self.states.retain(|id, _| *id == country_id);
        self.cities.clear();
        self.selected_country = Some(country_id);
        self.selected_state = None;
    }

    /// Marks `state_id` as the current state.
    ///
    /// Changing the state drops the city lists of every other state.
    pub fn select_state(&mut self, state_id: i64) {
        if self.selected_state == Some(state_id) {
            return;
        }
        self.cities.retain(|id, _| *id == state_id);
        self.selected_state = Some(state_id);
    }

    /// Drops every cached list and the current selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn selected_country(&self) -> Option<i64> {
        self.selected_country
    }

    #[must_use]
    pub const fn selected_state(&self) -> Option<i64> {
        self.selected_state
    }

    /// Whether the state list of `country_id` is cached.
    #[must_use]
    pub fn has_states(&self, country_id: i64) -> bool {
        self.states.contains_key(&country_id)
    }

    /// Whether the city list of `state_id` is cached.
    #[must_use]
    pub fn has_cities(&self, state_id: i64) -> bool {
        self.cities.contains_key(&state_id)
    }

    /// Whether the country list is cached.
    #[must_use]
    pub const fn has_countries(&self) -> bool {
        self.countries.is_some()
    }
}
