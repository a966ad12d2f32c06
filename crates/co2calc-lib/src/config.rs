//! Runtime configuration for the estimator and its external collaborators.
//!
//! Each config struct has a `Default` carrying the canonical constants and a
//! `from_env` constructor. `from_env` delegates to `from_vars`, which takes a
//! lookup closure so tests never need to mutate the process environment.
//! Unparsable or out-of-range values fall back to the default with a warning.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::retry::RetryPolicy;

pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_ROAD_CORRECTION_FACTOR: f64 = 1.25;
pub const DEFAULT_PRICE_PER_CREDIT: f64 = 52.86;
pub const DEFAULT_KG_PER_CREDIT: f64 = 1000.0;
pub const DEFAULT_TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.0;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_COUNTRY: &str = "Brasil";
pub const DEFAULT_GEOCODER_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

pub const DEFAULT_DIVISIONS_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

pub const ENV_EARTH_RADIUS_KM: &str = "CO2CALC_EARTH_RADIUS_KM";
pub const ENV_ROAD_CORRECTION: &str = "CO2CALC_ROAD_CORRECTION";
pub const ENV_PRICE_PER_CREDIT: &str = "CO2CALC_PRICE_PER_CREDIT";
pub const ENV_TREE_ABSORPTION_KG: &str = "CO2CALC_TREE_ABSORPTION_KG";
pub const ENV_GEOCODER_URL: &str = "CO2CALC_GEOCODER_URL";
pub const ENV_GEOCODER_COUNTRY: &str = "CO2CALC_GEOCODER_COUNTRY";
pub const ENV_GEOCODER_TIMEOUT_MS: &str = "CO2CALC_GEOCODER_TIMEOUT_MS";
pub const ENV_GEOCODER_MAX_ATTEMPTS: &str = "CO2CALC_GEOCODER_MAX_ATTEMPTS";
pub const ENV_GEOCODER_BACKOFF_MS: &str = "CO2CALC_GEOCODER_BACKOFF_MS";
pub const ENV_GEOCODER_CACHE_CAPACITY: &str = "CO2CALC_GEOCODER_CACHE_CAPACITY";
pub const ENV_DIVISIONS_URL: &str = "CO2CALC_DIVISIONS_URL";

/// Immutable numeric constants used by the distance and emission stages.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub earth_radius_km: f64,
    pub road_correction_factor: f64,
    pub price_per_credit: f64,
    pub kg_per_credit: f64,
    pub tree_absorption_kg_per_year: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
            road_correction_factor: DEFAULT_ROAD_CORRECTION_FACTOR,
            price_per_credit: DEFAULT_PRICE_PER_CREDIT,
            kg_per_credit: DEFAULT_KG_PER_CREDIT,
            tree_absorption_kg_per_year: DEFAULT_TREE_ABSORPTION_KG_PER_YEAR,
        }
    }
}

impl EstimatorConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            earth_radius_km: positive(&lookup, ENV_EARTH_RADIUS_KM, DEFAULT_EARTH_RADIUS_KM),
            road_correction_factor: positive(
                &lookup,
                ENV_ROAD_CORRECTION,
                DEFAULT_ROAD_CORRECTION_FACTOR,
            ),
            price_per_credit: positive(&lookup, ENV_PRICE_PER_CREDIT, DEFAULT_PRICE_PER_CREDIT),
            kg_per_credit: DEFAULT_KG_PER_CREDIT,
            tree_absorption_kg_per_year: positive(
                &lookup,
                ENV_TREE_ABSORPTION_KG,
                DEFAULT_TREE_ABSORPTION_KG_PER_YEAR,
            ),
        }
    }
}

/// Settings for the outbound geocoding provider and its cache.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub country: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub cache_capacity: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            country: DEFAULT_GEOCODER_COUNTRY.to_string(),
            user_agent: default_user_agent(),
            timeout: DEFAULT_GEOCODER_TIMEOUT,
            retry: RetryPolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let retry = RetryPolicy {
            max_attempts: parsed(&lookup, ENV_GEOCODER_MAX_ATTEMPTS)
                .filter(|attempts: &u32| *attempts > 0)
                .unwrap_or(defaults.retry.max_attempts),
            initial_delay: parsed(&lookup, ENV_GEOCODER_BACKOFF_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.initial_delay),
            ..defaults.retry.clone()
        };

        Self {
            base_url: text(&lookup, ENV_GEOCODER_URL).unwrap_or(defaults.base_url),
            country: text(&lookup, ENV_GEOCODER_COUNTRY).unwrap_or(defaults.country),
            user_agent: defaults.user_agent,
            timeout: parsed(&lookup, ENV_GEOCODER_TIMEOUT_MS)
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retry,
            cache_capacity: parsed(&lookup, ENV_GEOCODER_CACHE_CAPACITY)
                .filter(|capacity: &usize| *capacity > 0)
                .unwrap_or(defaults.cache_capacity),
        }
    }
}

/// Settings for the administrative-division (states/municipalities) provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionsConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for DivisionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIVISIONS_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: DEFAULT_GEOCODER_TIMEOUT,
        }
    }
}

impl DivisionsConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: text(&lookup, ENV_DIVISIONS_URL).unwrap_or(defaults.base_url),
            user_agent: defaults.user_agent,
            timeout: parsed(&lookup, ENV_GEOCODER_TIMEOUT_MS)
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// User-Agent sent to public providers; Nominatim's usage policy requires an
/// identifying value.
pub fn default_user_agent() -> String {
    format!(
        "co2calc-lib/{version} ({repo})",
        version = env!("CARGO_PKG_VERSION"),
        repo = "https://github.com/co2calc/co2calc-rs"
    )
}

fn text<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = text(lookup, key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

fn positive<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    match parsed::<F, f64>(lookup, key) {
        Some(value) if value.is_finite() && value > 0.0 => value,
        Some(value) => {
            warn!(key, value, default, "configuration value must be positive; using default");
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn estimator_defaults_when_unset() {
        let config = EstimatorConfig::from_vars(vars(&[]));
        assert_eq!(config, EstimatorConfig::default());
        assert_eq!(config.road_correction_factor, 1.25);
        assert_eq!(config.price_per_credit, 52.86);
    }

    #[test]
    fn estimator_reads_overrides() {
        let config = EstimatorConfig::from_vars(vars(&[
            (ENV_ROAD_CORRECTION, "1.4"),
            (ENV_PRICE_PER_CREDIT, "60"),
        ]));
        assert_eq!(config.road_correction_factor, 1.4);
        assert_eq!(config.price_per_credit, 60.0);
        assert_eq!(config.earth_radius_km, DEFAULT_EARTH_RADIUS_KM);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = EstimatorConfig::from_vars(vars(&[
            (ENV_ROAD_CORRECTION, "fast"),
            (ENV_EARTH_RADIUS_KM, "-1"),
        ]));
        assert_eq!(config.road_correction_factor, DEFAULT_ROAD_CORRECTION_FACTOR);
        assert_eq!(config.earth_radius_km, DEFAULT_EARTH_RADIUS_KM);
    }

    #[test]
    fn geocoder_reads_overrides() {
        let config = GeocoderConfig::from_vars(vars(&[
            (ENV_GEOCODER_URL, "http://localhost:8080"),
            (ENV_GEOCODER_TIMEOUT_MS, "2500"),
            (ENV_GEOCODER_MAX_ATTEMPTS, "4"),
            (ENV_GEOCODER_CACHE_CAPACITY, "16"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.country, DEFAULT_GEOCODER_COUNTRY);
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn geocoder_ignores_zero_capacity() {
        let config = GeocoderConfig::from_vars(vars(&[(ENV_GEOCODER_CACHE_CAPACITY, "0")]));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn user_agent_identifies_crate() {
        assert!(default_user_agent().starts_with("co2calc-lib/"));
    }
}
