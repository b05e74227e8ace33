//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! The public instance allows **1 request per second** and rejects
//! requests without a `User-Agent`. [`NominatimGeocoder`] sets the agent on
//! its HTTP client and spaces requests by the configured `rate_limit_ms`.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/> and
//! <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::{Duration, Instant};

use realty_geo_geography_models::{
    ForwardGeocodeResult, GeoCoordinate, PlaceComponents, ReverseGeocodeResult,
};
use tokio::sync::Mutex;

use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{GeocodeError, ReverseGeocoder};

/// Detail level for reverse lookups. 18 is building level, which returns
/// the full address hierarchy.
const REVERSE_ZOOM: &str = "18";

/// Rate-limited Nominatim client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    rate_limit: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Creates a client for the Nominatim instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, rate_limit_ms: u64) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Duration::from_millis(rate_limit_ms),
            last_request: Mutex::new(None),
        })
    }

    /// Creates a client from a service registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let ProviderConfig::Nominatim {
            base_url,
            user_agent,
            rate_limit_ms,
        } = &service.provider;
        log::debug!("Using geocoding service '{}' at {base_url}", service.id);
        Self::new(base_url, user_agent, *rate_limit_ms)
    }

    /// The instance root, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits until at least `rate_limit` has passed since the previous
    /// request.
    async fn throttle(&self) {
        if self.rate_limit.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.rate_limit {
                tokio::time::sleep(self.rate_limit - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait::async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        coordinate: GeoCoordinate,
    ) -> Result<ReverseGeocodeResult, GeocodeError> {
        self.throttle().await;
        reverse_geocode(&self.client, &self.base_url, coordinate).await
    }

    async fn forward_geocode(
        &self,
        query: &str,
    ) -> Result<Option<ForwardGeocodeResult>, GeocodeError> {
        self.throttle().await;
        forward_geocode(&self.client, &self.base_url, query).await
    }
}

/// Reverse-geocodes a coordinate using the Nominatim `/reverse` endpoint.
///
/// The client must carry a `User-Agent`; the caller is responsible for rate
/// limiting.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the status is not
/// successful, Nominatim reports an error (e.g. "Unable to geocode" over
/// open water), or the body cannot be parsed.
pub async fn reverse_geocode(
    client: &reqwest::Client,
    base_url: &str,
    coordinate: GeoCoordinate,
) -> Result<ReverseGeocodeResult, GeocodeError> {
    let lat = coordinate.latitude.to_string();
    let lon = coordinate.longitude.to_string();

    log::debug!("Reverse geocoding ({lat}, {lon})");

    let resp = client
        .get(format!("{base_url}/reverse"))
        .query(&[
            ("format", "json"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("zoom", REVERSE_ZOOM),
            ("addressdetails", "1"),
        ])
        .send()
        .await?;

    let body = check_status(resp).await?;
    parse_reverse_response(&body)
}

/// Geocodes a free-form address using the Nominatim `/search` endpoint.
///
/// Returns `Ok(None)` when the address is not found.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the status is not
/// successful, or the body cannot be parsed.
pub async fn forward_geocode(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Option<ForwardGeocodeResult>, GeocodeError> {
    log::debug!("Forward geocoding {query:?}");

    let resp = client
        .get(format!("{base_url}/search"))
        .query(&[
            ("format", "json"),
            ("q", query),
            ("limit", "1"),
            ("addressdetails", "1"),
        ])
        .send()
        .await?;

    let body = check_status(resp).await?;
    parse_search_response(&body)
}

async fn check_status(resp: reqwest::Response) -> Result<serde_json::Value, GeocodeError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }
    if !status.is_success() {
        return Err(GeocodeError::Status {
            status: status.as_u16(),
        });
    }
    Ok(resp.json().await?)
}

/// Parses a Nominatim `/reverse` response.
fn parse_reverse_response(body: &serde_json::Value) -> Result<ReverseGeocodeResult, GeocodeError> {
    if !body.is_object() {
        return Err(GeocodeError::Parse {
            message: "Nominatim reverse response is not an object".to_string(),
        });
    }

    if let Some(error) = body.get("error") {
        return Err(GeocodeError::Provider {
            message: error
                .as_str()
                .map_or_else(|| error.to_string(), String::from),
        });
    }

    Ok(ReverseGeocodeResult {
        display_name: body["display_name"].as_str().map(String::from),
        components: parse_components(&body["address"]),
        coordinate: parse_coordinate(body),
    })
}

/// Parses a Nominatim `/search` response.
fn parse_search_response(
    body: &serde_json::Value,
) -> Result<Option<ForwardGeocodeResult>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim search response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let coordinate = parse_coordinate(first).ok_or_else(|| GeocodeError::Parse {
        message: "Missing or invalid lat/lon in Nominatim response".to_string(),
    })?;

    Ok(Some(ForwardGeocodeResult {
        display_name: first["display_name"].as_str().map(String::from),
        coordinate,
        components: parse_components(&first["address"]),
    }))
}

/// Nominatim encodes `lat`/`lon` as strings.
fn parse_coordinate(value: &serde_json::Value) -> Option<GeoCoordinate> {
    let number = |key: &str| match &value[key] {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    GeoCoordinate::new(number("lat")?, number("lon")?).ok()
}

/// Maps a Nominatim `address` object to [`PlaceComponents`].
fn parse_components(address: &serde_json::Value) -> PlaceComponents {
    let field = |key: &str| {
        address[key]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let first_of = |keys: &[&str]| {
        keys.iter()
            .copied()
            .find_map(field)
            .unwrap_or_default()
            .to_string()
    };

    PlaceComponents {
        city: first_of(&["city", "town", "village"]),
        town: first_of(&["town"]),
        village: first_of(&["village"]),
        municipality: first_of(&["municipality"]),
        county: first_of(&["county"]),
        suburb: first_of(&["suburb"]),
        neighbourhood: first_of(&["neighbourhood"]),
        state: first_of(&["state", "region"]),
        country: first_of(&["country"]),
        country_code: first_of(&["country_code"]).to_uppercase(),
        postcode: first_of(&["postcode"]),
        street: first_of(&["road"]),
        house_number: first_of(&["house_number"]),
    }
}
