//! HTTP implementation of [`ReferenceDataProvider`].

use std::future::Future;
use std::time::Duration;

use realty_geo_geography_models::{CityRecord, CountryRecord, StateRecord};

use crate::envelope::{extract_page, extract_records};
use crate::{ReferenceConfig, ReferenceDataProvider, ReferenceError, retry};

/// Client for the CRM backend's `/api/geographic/` endpoints.
pub struct HttpReferenceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    page_size: u32,
    max_pages: u32,
}

impl HttpReferenceClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ReferenceConfig) -> Result<Self, ReferenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn countries_url(&self) -> String {
        format!("{}/api/geographic/countries/", self.base_url)
    }

    fn states_url(&self, country_id: i64) -> String {
        format!(
            "{}/api/geographic/countries/{country_id}/states/",
            self.base_url
        )
    }

    fn cities_url(&self, state_id: i64) -> String {
        format!("{}/api/geographic/states/{state_id}/cities/", self.base_url)
    }
}

#[async_trait::async_trait]
impl ReferenceDataProvider for HttpReferenceClient {
    async fn countries(&self, search: Option<&str>) -> Result<Vec<CountryRecord>, ReferenceError> {
        let url = self.countries_url();
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let body = retry::send_json(|| {
            let request = self.get(&url);
            match search {
                Some(term) => request.query(&[("search", term)]),
                None => request,
            }
        })
        .await?;

        let countries: Vec<CountryRecord> = extract_records(&body)?;
        log::debug!("Fetched {} countries", countries.len());
        Ok(countries)
    }

    async fn states_by_country(&self, country_id: i64) -> Result<Vec<StateRecord>, ReferenceError> {
        if country_id <= 0 {
            return Err(ReferenceError::InvalidArgument {
                message: format!("country id must be positive, got {country_id}"),
            });
        }

        let url = self.states_url(country_id);
        let body = retry::send_json(|| self.get(&url)).await?;

        let states: Vec<StateRecord> = extract_records(&body)?;
        log::debug!("Fetched {} states for country {country_id}", states.len());
        Ok(states)
    }

    async fn cities_by_state(&self, state_id: i64) -> Result<Vec<CityRecord>, ReferenceError> {
        if state_id <= 0 {
            return Err(ReferenceError::InvalidArgument {
                message: format!("state id must be positive, got {state_id}"),
            });
        }

        let url = self.cities_url(state_id);
        let page_size = self.page_size.to_string();

        let cities = collect_pages(self.page_size, self.max_pages, |page| {
            let url = &url;
            let page_size = &page_size;
            async move {
                let page = page.to_string();
                retry::send_json(|| {
                    self.get(url)
                        .query(&[("page", page.as_str()), ("page_size", page_size.as_str())])
                })
                .await
            }
        })
        .await?;

        log::debug!("Fetched {} cities for state {state_id}", cities.len());
        Ok(cities)
    }
}

/// Fetches pages `1..=max_pages` with `fetch_page` and concatenates their
/// records.
///
/// Stops after a page that neither advertises a `next` page nor came back
/// full from a paginated `results` envelope. Bare arrays and flat `data`
/// lists are whole responses and end the walk after one request. A 404 on any page after the first is treated as the end of the
/// list, since page-number paginators reject out-of-range pages that way.
///
/// # Errors
///
/// Returns the first error from `fetch_page` or from envelope parsing.
pub async fn collect_pages<T, F, Fut>(
    page_size: u32,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<Vec<T>, ReferenceError>
where
    T: serde::de::DeserializeOwned,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, ReferenceError>>,
{
    let mut records = Vec::new();

    for page_num in 1..=max_pages {
        let body = match fetch_page(page_num).await {
            Ok(body) => body,
            Err(ReferenceError::Status { status: 404, .. }) if page_num > 1 => break,
            Err(e) => return Err(e),
        };

        let page = extract_page::<T>(&body)?;
        let count = page.records.len();
        let full = page.paginated && u32::try_from(count).is_ok_and(|n| n >= page_size);
        records.extend(page.records);

        log::debug!(
            "Page {page_num}: {count} records (total: {})",
            records.len()
        );

        if count == 0 || !(page.has_next || full) {
            return Ok(records);
        }

        if page_num == max_pages {
            log::warn!(
                "Stopped after {max_pages} pages with more available ({} records so far)",
                records.len()
            );
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    fn city_page(ids: std::ops::Range<i64>, next: bool) -> serde_json::Value {
        let results: Vec<_> = ids
            .map(|id| json!({ "id": id, "name": format!("City {id}") }))
            .collect();
        let next = if next { json!("?page=next") } else { json!(null) };
        json!({
            "status": "success",
            "data": { "results": results, "next": next }
        })
    }

    #[tokio::test]
    async fn follows_next_links() {
        let requested = RefCell::new(Vec::new());
        let cities: Vec<CityRecord> = collect_pages(100, 10, |page| {
            requested.borrow_mut().push(page);
            let body = match page {
                1 => city_page(1..3, true),
                2 => city_page(3..5, true),
                _ => city_page(5..6, false),
            };
            async move { Ok(body) }
        })
        .await
        .unwrap();

        assert_eq!(cities.len(), 5);
        assert_eq!(*requested.borrow(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn full_paginated_pages_continue() {
        let cities: Vec<CityRecord> = collect_pages(2, 10, |page| {
            let body = match page {
                1 => city_page(1..3, false),
                _ => city_page(3..4, false),
            };
            async move { Ok(body) }
        })
        .await
        .unwrap();
        assert_eq!(cities.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn flat_list_is_fetched_once() {
        let calls = RefCell::new(0);
        let cities: Vec<CityRecord> = collect_pages(2, 50, |_| {
            *calls.borrow_mut() += 1;
            async {
                Ok(json!({
                    "status": "success",
                    "data": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }]
                }))
            }
        })
        .await
        .unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn full_bare_array_is_fetched_once() {
        let calls = RefCell::new(0);
        let cities: Vec<CityRecord> = collect_pages(2, 50, |_| {
            *calls.borrow_mut() += 1;
            async { Ok(json!([{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }])) }
        })
        .await
        .unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn stops_at_max_pages() {
        let calls = RefCell::new(0);
        let cities: Vec<CityRecord> = collect_pages(1, 3, |page| {
            *calls.borrow_mut() += 1;
            let id = i64::from(page);
            async move { Ok(city_page(id..id + 1, true)) }
        })
        .await
        .unwrap();
        assert_eq!(cities.len(), 3);
        assert_eq!(*calls.borrow(), 3);
    }

    #[tokio::test]
    async fn not_found_after_first_page_ends_the_list() {
        let cities: Vec<CityRecord> = collect_pages(2, 10, |page| async move {
            if page == 1 {
                Ok(city_page(1..3, true))
            } else {
                Err(ReferenceError::Status {
                    status: 404,
                    url: "https://crm.example.com/?page=2".to_string(),
                })
            }
        })
        .await
        .unwrap();
        assert_eq!(cities.len(), 2);
    }

    #[tokio::test]
    async fn not_found_on_first_page_is_an_error() {
        let result: Result<Vec<CityRecord>, _> = collect_pages(2, 10, |_| async {
            Err(ReferenceError::Status {
                status: 404,
                url: "https://crm.example.com/".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(ReferenceError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn backend_error_mid_pagination_fails() {
        let result: Result<Vec<CityRecord>, _> = collect_pages(1, 10, |page| {
            let body = if page == 1 {
                city_page(1..2, true)
            } else {
                json!({ "status": "error", "message": "Database connection failed" })
            };
            async move { Ok(body) }
        })
        .await;
        assert!(matches!(result, Err(ReferenceError::Backend { .. })));
    }

    #[tokio::test]
    async fn empty_first_page() {
        let cities: Vec<CityRecord> = collect_pages(100, 10, |_| async { Ok(json!([])) })
            .await
            .unwrap();
        assert!(cities.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_positive_ids() {
        let client = HttpReferenceClient::new(&ReferenceConfig::default()).unwrap();
        assert!(matches!(
            client.cities_by_state(0).await,
            Err(ReferenceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.cities_by_state(-3).await,
            Err(ReferenceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.states_by_country(0).await,
            Err(ReferenceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn builds_endpoint_urls() {
        let config = ReferenceConfig {
            base_url: "https://crm.example.com/".to_string(),
            ..ReferenceConfig::default()
        };
        let client = HttpReferenceClient::new(&config).unwrap();
        assert_eq!(
            client.countries_url(),
            "https://crm.example.com/api/geographic/countries/"
        );
        assert_eq!(
            client.states_url(233),
            "https://crm.example.com/api/geographic/countries/233/states/"
        );
        assert_eq!(
            client.cities_url(1436),
            "https://crm.example.com/api/geographic/states/1436/cities/"
        );
    }
}
