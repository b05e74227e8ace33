//! Geocoding endpoints defined in `services/*.toml`, embedded at compile
//! time.
//!
//! Every endpoint speaks the Nominatim API; entries differ in instance URL,
//! `User-Agent`, and throttling. The CLI picks one with [`find_service`] or
//! falls back to [`primary_service`].

use serde::Deserialize;

/// One configured geocoding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    pub id: String,
    pub name: String,
    /// Disabled endpoints can still be selected by id.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower is preferred.
    pub priority: u32,
    pub provider: ProviderConfig,
}

/// Endpoint settings, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// A Nominatim instance, public or self-hosted.
    Nominatim {
        base_url: String,
        /// Required by the public instance's usage policy.
        user_agent: String,
        /// Minimum spacing between requests; 0 disables throttling.
        #[serde(default)]
        rate_limit_ms: u64,
    },
}

const fn default_enabled() -> bool {
    true
}

impl GeocodingService {
    /// Parses one service definition.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the definition is malformed or names an
    /// unknown provider type.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(source)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        let ProviderConfig::Nominatim { base_url, .. } = &self.provider;
        base_url
    }
}

const EMBEDDED: &[(&str, &str)] = &[
    ("nominatim.toml", include_str!("../services/nominatim.toml")),
    (
        "nominatim_local.toml",
        include_str!("../services/nominatim_local.toml"),
    ),
];

/// Returns every embedded service, enabled or not, in file order.
///
/// # Panics
///
/// Panics if an embedded file is malformed; the files ship with the crate
/// and are covered by tests.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    EMBEDDED
        .iter()
        .map(|(file, source)| {
            GeocodingService::from_toml(source)
                .unwrap_or_else(|e| panic!("Invalid geocoding service {file}: {e}"))
        })
        .collect()
}

/// Returns the enabled services, most preferred first.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services = all_services();
    services.retain(|s| s.enabled);
    services.sort_by_key(|s| s.priority);
    services
}

/// Returns the most preferred enabled service.
#[must_use]
pub fn primary_service() -> Option<GeocodingService> {
    all_services()
        .into_iter()
        .filter(|s| s.enabled)
        .min_by_key(|s| s.priority)
}

/// Looks up a service by id, including disabled ones.
#[must_use]
pub fn find_service(id: &str) -> Option<GeocodingService> {
    all_services().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_files_define_distinct_ids() {
        let ids: Vec<String> = all_services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["nominatim", "nominatim_local"]);
    }

    #[test]
    fn every_service_sends_a_user_agent() {
        for svc in all_services() {
            let ProviderConfig::Nominatim { user_agent, .. } = &svc.provider;
            assert!(!user_agent.trim().is_empty(), "{} has no user_agent", svc.id);
            assert!(svc.base_url().starts_with("http"), "{} base_url", svc.id);
        }
    }

    #[test]
    fn primary_is_public_nominatim() {
        let svc = primary_service().unwrap();
        assert_eq!(svc.id, "nominatim");
        assert_eq!(svc.base_url(), "https://nominatim.openstreetmap.org");
        let ProviderConfig::Nominatim { rate_limit_ms, .. } = svc.provider;
        assert_eq!(rate_limit_ms, 1000);
    }

    #[test]
    fn local_instance_is_opt_in() {
        assert!(enabled_services().iter().all(|s| s.id != "nominatim_local"));
        let local = find_service("nominatim_local").unwrap();
        assert!(!local.enabled);
        assert_eq!(local.base_url(), "http://localhost:8080");
        assert!(find_service("pelias").is_none());
    }

    #[test]
    fn defaults_apply_to_sparse_definitions() {
        let svc = GeocodingService::from_toml(
            r#"
            id = "osm_eu"
            name = "OSM Europe"
            priority = 5

            [provider]
            type = "nominatim"
            base_url = "https://nominatim.example.eu"
            user_agent = "RealtyGeo/1.0"
            "#,
        )
        .unwrap();
        assert!(svc.enabled);
        let ProviderConfig::Nominatim { rate_limit_ms, .. } = svc.provider;
        assert_eq!(rate_limit_ms, 0);
    }

    #[test]
    fn unknown_provider_type_is_rejected() {
        let result = GeocodingService::from_toml(
            r#"
            id = "pelias"
            name = "Pelias"
            priority = 1

            [provider]
            type = "pelias"
            base_url = "http://localhost:4000"
            "#,
        );
        assert!(result.is_err());
    }
}
