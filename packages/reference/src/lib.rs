#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reference data from the CRM backend.
//!
//! The backend exposes the administrative hierarchy as three endpoints
//! (countries, states of a country, cities of a state). This crate wraps
//! them behind the [`ReferenceDataProvider`] trait, with an HTTP
//! implementation in [`client`], response-envelope handling in
//! [`envelope`], and retry/backoff in [`retry`].

pub mod client;
pub mod envelope;
pub mod retry;

use realty_geo_geography_models::{CityRecord, CountryRecord, StateRecord};
use thiserror::Error;

pub use client::HttpReferenceClient;

/// Errors from reference-data lookups.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A record did not have the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The backend reported `status: "error"` in the response body.
    #[error("Backend error: {message}")]
    Backend {
        /// Message from the backend.
        message: String,
    },

    /// The response body was not a recognised envelope.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The caller passed an argument the backend cannot serve.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },
}

/// Read access to the country → state → city hierarchy.
#[async_trait::async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    /// Lists countries, optionally filtered by a backend-side search term.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the lookup fails.
    async fn countries(&self, search: Option<&str>) -> Result<Vec<CountryRecord>, ReferenceError>;

    /// Lists the states of a country.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the lookup fails.
    async fn states_by_country(&self, country_id: i64) -> Result<Vec<StateRecord>, ReferenceError>;

    /// Lists every city of a state, following pagination to the end.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::InvalidArgument`] if `state_id` is not
    /// positive, or another [`ReferenceError`] if the lookup fails.
    async fn cities_by_state(&self, state_id: i64) -> Result<Vec<CityRecord>, ReferenceError>;
}

/// Connection settings for the CRM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConfig {
    /// Backend root, e.g. `https://crm.example.com`.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub token: Option<String>,
    /// Records requested per page of cities.
    pub page_size: u32,
    /// Upper bound on pages fetched for one state.
    pub max_pages: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Environment variable holding the backend root.
pub const API_URL_VAR: &str = "REALTY_GEO_API_URL";
/// Environment variable holding the bearer token.
pub const API_TOKEN_VAR: &str = "REALTY_GEO_API_TOKEN";
/// Environment variable overriding the city page size.
pub const PAGE_SIZE_VAR: &str = "REALTY_GEO_PAGE_SIZE";

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            page_size: 100,
            max_pages: 50,
            timeout_secs: 30,
        }
    }
}

impl ReferenceConfig {
    /// Reads the configuration from `REALTY_GEO_API_URL`,
    /// `REALTY_GEO_API_TOKEN`, and `REALTY_GEO_PAGE_SIZE`, falling back to
    /// the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::InvalidArgument`] if the page size is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ReferenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ReferenceConfig::from_env`], reading variables through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::InvalidArgument`] if the page size is not a
    /// positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ReferenceError> {
        let mut config = Self::default();
        let present = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = present(API_URL_VAR) {
            config.base_url = url;
        }
        config.token = present(API_TOKEN_VAR);
        if let Some(size) = present(PAGE_SIZE_VAR) {
            config.page_size = size
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ReferenceError::InvalidArgument {
                    message: format!("{PAGE_SIZE_VAR} must be a positive integer, got {size:?}"),
                })?;
        }

        Ok(config)
    }
}
