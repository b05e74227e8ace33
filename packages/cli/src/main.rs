#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for geocoding and geographic reconciliation.
//!
//! Subcommands geocode a point or address through the configured Nominatim
//! service, reconcile a point with the CRM backend's country → state →
//! city reference data, or run the city matchers against a local JSON
//! file of cities. Results are printed to stdout as pretty JSON.
//!
//! The backend is configured through `REALTY_GEO_API_URL`,
//! `REALTY_GEO_API_TOKEN`, and `REALTY_GEO_PAGE_SIZE`; logging through
//! `RUST_LOG`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use realty_geo_geocoder::service_registry::{find_service, primary_service};
use realty_geo_geocoder::{NominatimGeocoder, ReverseGeocoder};
use realty_geo_geography_models::{
    CityMatch, CityRecord, GeoCoordinate, MatchTier, ReconciledLocation, ReverseGeocodeResult,
};
use realty_geo_matching::{
    DEFAULT_MAX_DISTANCE_KM, find_best_matching_city_with_tier, find_nearest_city_with_distance,
};
use realty_geo_reconcile::{GeoReconciler, ReconcileOptions};
use realty_geo_reference::envelope::extract_records;
use realty_geo_reference::{HttpReferenceClient, ReferenceConfig};
use serde::Serialize;

type CliResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// Geocode places and reconcile them with geographic reference data.
#[derive(Parser)]
#[command(name = "realty_geo")]
#[command(about = "Geocode places and reconcile them with geographic reference data")]
struct Cli {
    /// Geocoding service id from the service registry (default: the
    /// enabled service with the highest priority).
    #[arg(long, global = true)]
    geocoder: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Reverse-geocode a coordinate into address components.
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Geocode a free-form address into a coordinate.
    Forward {
        /// Address to look up (e.g., "1600 Pennsylvania Ave, Washington DC").
        query: String,
    },

    /// Reverse-geocode a coordinate and reconcile it with the backend's
    /// country, state, and city lists.
    Reconcile {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Search radius of the nearest-city fallback.
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM)]
        max_distance_km: f64,

        /// Disable the nearest-city fallback.
        #[arg(long)]
        no_fallback: bool,
    },

    /// Match place-name variants against a JSON file of cities.
    MatchCity {
        /// JSON file with a city list (bare array or backend envelope).
        #[arg(long)]
        cities: PathBuf,

        /// Name variants, most specific first.
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Find the nearest city in a JSON file of cities.
    NearestCity {
        /// JSON file with a city list (bare array or backend envelope).
        #[arg(long)]
        cities: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Search radius.
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM)]
        max_distance_km: f64,
    },
}

/// Output of the `reconcile` subcommand.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReconcileReport<'a> {
    geocode: &'a ReverseGeocodeResult,
    location: &'a ReconciledLocation,
    unresolved: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> CliResult {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let geocoder = cli.geocoder.as_deref();

    match cli.command {
        Commands::Reverse { lat, lng } => cmd_reverse(geocoder, lat, lng).await,
        Commands::Forward { query } => cmd_forward(geocoder, &query).await,
        Commands::Reconcile {
            lat,
            lng,
            max_distance_km,
            no_fallback,
        } => {
            let options = ReconcileOptions {
                max_distance_km,
                coordinate_fallback: !no_fallback,
            };
            cmd_reconcile(geocoder, lat, lng, options).await
        }
        Commands::MatchCity { cities, names } => cmd_match_city(&cities, names),
        Commands::NearestCity {
            cities,
            lat,
            lng,
            max_distance_km,
        } => cmd_nearest_city(&cities, lat, lng, max_distance_km),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_reverse(service_id: Option<&str>, lat: f64, lng: f64) -> CliResult {
    let coordinate = GeoCoordinate::new(lat, lng)?;
    let geocoder = build_geocoder(service_id)?;
    let result = geocoder.reverse_geocode(coordinate).await?;
    print_json(&result)
}

async fn cmd_forward(service_id: Option<&str>, query: &str) -> CliResult {
    let geocoder = build_geocoder(service_id)?;
    let result = geocoder.forward_geocode(query).await?;
    if result.is_none() {
        log::warn!("Address not found: {query:?}");
    }
    print_json(&result)
}

async fn cmd_reconcile(
    service_id: Option<&str>,
    lat: f64,
    lng: f64,
    options: ReconcileOptions,
) -> CliResult {
    let coordinate = GeoCoordinate::new(lat, lng)?;
    let geocoder = build_geocoder(service_id)?;
    let geocode = geocoder.reverse_geocode(coordinate).await?;

    // Fall back to the query point if the provider did not echo one.
    let geocode = ReverseGeocodeResult {
        coordinate: geocode.coordinate.or(Some(coordinate)),
        ..geocode
    };

    let config = ReferenceConfig::from_env()?;
    log::info!("Using reference backend at {}", config.base_url);
    let client = HttpReferenceClient::new(&config)?;

    let mut reconciler = GeoReconciler::with_options(client, options);
    let location = reconciler.reconcile(&geocode).await?;

    print_json(&ReconcileReport {
        geocode: &geocode,
        unresolved: location.unresolved_fields(),
        location: &location,
    })
}

fn cmd_match_city(path: &Path, names: Vec<String>) -> CliResult {
    let cities = load_cities(path)?;
    let matched = find_best_matching_city_with_tier(names, &cities).map(|(city, tier)| CityMatch {
        city: city.clone(),
        tier,
        distance_km: None,
    });
    print_json(&matched)
}

fn cmd_nearest_city(path: &Path, lat: f64, lng: f64, max_distance_km: f64) -> CliResult {
    let cities = load_cities(path)?;
    let nearest = find_nearest_city_with_distance(lat, lng, &cities, max_distance_km).map(
        |(city, distance)| CityMatch {
            city: city.clone(),
            tier: MatchTier::CoordinateNearest,
            distance_km: Some(distance),
        },
    );
    print_json(&nearest)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_geocoder(
    service_id: Option<&str>,
) -> Result<NominatimGeocoder, Box<dyn std::error::Error>> {
    let service = match service_id {
        Some(id) => find_service(id).ok_or_else(|| format!("Unknown geocoding service '{id}'"))?,
        None => primary_service().ok_or("No enabled geocoding service")?,
    };
    Ok(NominatimGeocoder::from_service(&service)?)
}

/// Reads a city list in any envelope the backend produces.
fn load_cities(path: &Path) -> Result<Vec<CityRecord>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let body: serde_json::Value = serde_json::from_str(&text)?;
    let cities: Vec<CityRecord> = extract_records(&body)?;
    log::debug!("Loaded {} cities from {}", cities.len(), path.display());
    Ok(cities)
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["realty_geo", "reverse", "--lat", "25.76", "--lng", "-80.19"])
            .unwrap();
        match cli.command {
            Commands::Reverse { lat, lng } => {
                assert!((lat - 25.76).abs() < f64::EPSILON);
                assert!((lng - -80.19).abs() < f64::EPSILON);
            }
            _ => panic!("expected reverse"),
        }
    }

    #[test]
    fn reconcile_defaults_to_50_km_with_fallback() {
        let cli = Cli::try_parse_from([
            "realty_geo",
            "reconcile",
            "--lat",
            "40.6782",
            "--lng",
            "-73.9442",
        ])
        .unwrap();
        match cli.command {
            Commands::Reconcile {
                max_distance_km,
                no_fallback,
                ..
            } => {
                assert!((max_distance_km - 50.0).abs() < f64::EPSILON);
                assert!(!no_fallback);
            }
            _ => panic!("expected reconcile"),
        }
    }

    #[test]
    fn match_city_requires_names() {
        assert!(Cli::try_parse_from(["realty_geo", "match-city", "--cities", "c.json"]).is_err());
        let cli = Cli::try_parse_from([
            "realty_geo",
            "--geocoder",
            "nominatim",
            "match-city",
            "--cities",
            "c.json",
            "Brooklyn",
            "Kings County",
        ])
        .unwrap();
        assert_eq!(cli.geocoder.as_deref(), Some("nominatim"));
        match cli.command {
            Commands::MatchCity { names, .. } => assert_eq!(names, vec!["Brooklyn", "Kings County"]),
            _ => panic!("expected match-city"),
        }
    }

    #[test]
    fn unknown_geocoder_is_rejected() {
        assert!(build_geocoder(Some("pelias")).is_err());
    }
}
