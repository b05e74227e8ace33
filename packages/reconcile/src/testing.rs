//! In-memory reference data for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use realty_geo_geography_models::{
    CityRecord, CountryRecord, LookupTier, PlaceComponents, StateRecord,
};
use realty_geo_reference::{ReferenceDataProvider, ReferenceError};

/// Serves fixed lists and records every lookup it receives.
#[derive(Default)]
pub struct StubProvider {
    pub countries: Vec<CountryRecord>,
    pub states: BTreeMap<i64, Vec<StateRecord>>,
    pub cities: BTreeMap<i64, Vec<CityRecord>>,
    pub failing: Option<LookupTier>,
    calls: Mutex<Vec<String>>,
}

pub fn country(id: i64, name: &str, iso2: &str) -> CountryRecord {
    CountryRecord {
        id,
        name: name.to_string(),
        iso2: Some(iso2.to_string()),
        iso3: None,
    }
}

pub fn state(id: i64, name: &str, code: &str, country_id: i64) -> StateRecord {
    StateRecord {
        id,
        name: name.to_string(),
        state_code: Some(code.to_string()),
        country_id: Some(country_id),
    }
}

impl StubProvider {
    /// Canada and the United States; Florida with Miami and Orlando,
    /// Georgia with Atlanta, New York with Kings County and Brooklyn.
    pub fn florida() -> Self {
        let mut provider = Self {
            countries: vec![
                country(39, "Canada", "CA"),
                country(233, "United States", "US"),
            ],
            ..Self::default()
        };
        provider
            .states
            .insert(39, vec![state(866, "Ontario", "ON", 39)]);
        provider.states.insert(
            233,
            vec![
                state(1436, "Florida", "FL", 233),
                state(1437, "Georgia", "GA", 233),
                state(1452, "New York", "NY", 233),
            ],
        );
        provider.cities.insert(
            1436,
            vec![
                CityRecord::named(110_968, "Miami").at(25.76, -80.19),
                CityRecord::named(111_165, "Orlando").at(28.54, -81.38),
            ],
        );
        provider.cities.insert(
            1437,
            vec![CityRecord::named(113_241, "Atlanta").at(33.749, -84.388)],
        );
        provider.cities.insert(
            1452,
            vec![
                CityRecord::named(122_001, "Kings County"),
                CityRecord::named(122_002, "Brooklyn").at(40.6782, -73.9442),
            ],
        );
        provider
    }

    pub fn failing(mut self, tier: LookupTier) -> Self {
        self.failing = Some(tier);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, tier: LookupTier) -> Result<(), ReferenceError> {
        self.calls.lock().unwrap().push(call);
        if self.failing == Some(tier) {
            return Err(ReferenceError::Backend {
                message: "Database connection failed".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReferenceDataProvider for StubProvider {
    async fn countries(&self, _search: Option<&str>) -> Result<Vec<CountryRecord>, ReferenceError> {
        self.record("countries".to_string(), LookupTier::Countries)?;
        Ok(self.countries.clone())
    }

    async fn states_by_country(&self, country_id: i64) -> Result<Vec<StateRecord>, ReferenceError> {
        self.record(format!("states:{country_id}"), LookupTier::States)?;
        Ok(self.states.get(&country_id).cloned().unwrap_or_default())
    }

    async fn cities_by_state(&self, state_id: i64) -> Result<Vec<CityRecord>, ReferenceError> {
        self.record(format!("cities:{state_id}"), LookupTier::Cities)?;
        Ok(self.cities.get(&state_id).cloned().unwrap_or_default())
    }
}

/// Components of a point in Brooklyn as Nominatim returns them, with the
/// borough as `city` and the county listed after it.
pub fn brooklyn_components() -> PlaceComponents {
    PlaceComponents {
        city: "Brooklyn".to_string(),
        county: "Kings County".to_string(),
        state: "New York".to_string(),
        country: "United States".to_string(),
        country_code: "US".to_string(),
        ..PlaceComponents::default()
    }
}
