//! Test utilities for handler testing.
//!
//! Provides in-memory geocoding and division providers plus a ready-made
//! [`AppState`] wired to them, so handler tests never reach the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use co2calc_lib::{
    BrazilianState, Coordinate, DivisionProvider, Error, EstimatorConfig, GeoLookup,
    GeocodingProvider, LruCoordinateCache, Municipality, PlaceKey, Result, RetryPolicy,
    TripEstimator,
};

use crate::state::AppState;

/// Known places in the stub geocoder for use in tests.
pub mod fixture_places {
    pub const CURITIBA: (&str, &str) = ("Curitiba", "Paraná");
    pub const FLORIANOPOLIS: (&str, &str) = ("Florianópolis", "Santa Catarina");
    pub const SAO_PAULO: (&str, &str) = ("São Paulo", "SP");
    pub const RIO_DE_JANEIRO: (&str, &str) = ("Rio de Janeiro", "RJ");

    /// IBGE id of Paraná in the stub division provider.
    pub const PARANA_ID: u32 = 41;
}

/// Geocoder answering from a fixed table; counts calls.
pub struct StubGeocoder {
    places: HashMap<PlaceKey, Coordinate>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new() -> Self {
        use self::fixture_places::*;

        let entries = [
            (CURITIBA, (-25.4284, -49.2733)),
            (FLORIANOPOLIS, (-27.5954, -48.5480)),
            (SAO_PAULO, (-23.55, -46.63)),
            (RIO_DE_JANEIRO, (-22.91, -43.17)),
        ];
        let places = entries
            .into_iter()
            .filter_map(|((city, state), (lat, lon))| {
                Coordinate::new(lat, lon)
                    .ok()
                    .map(|coordinate| (PlaceKey::new(city, state), coordinate))
            })
            .collect();

        Self {
            places,
            unavailable: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A geocoder whose every call fails with an upstream error.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodingProvider for StubGeocoder {
    async fn geocode(&self, place: &PlaceKey) -> Result<Coordinate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(Error::Upstream {
                message: "stub geocoder unavailable".to_string(),
            });
        }
        self.places.get(place).copied().ok_or_else(|| Error::NotFound {
            query: place.query("Brasil"),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Division provider with Paraná and Santa Catarina; any other state id fails.
#[derive(Debug, Default)]
pub struct StubDivisions;

#[async_trait]
impl DivisionProvider for StubDivisions {
    async fn states(&self) -> Result<Vec<BrazilianState>> {
        Ok(vec![
            BrazilianState {
                id: fixture_places::PARANA_ID,
                sigla: "PR".to_string(),
                nome: "Paraná".to_string(),
            },
            BrazilianState {
                id: 42,
                sigla: "SC".to_string(),
                nome: "Santa Catarina".to_string(),
            },
        ])
    }

    async fn municipalities(&self, state_id: u32) -> Result<Vec<Municipality>> {
        match state_id {
            fixture_places::PARANA_ID => Ok(vec![
                Municipality {
                    id: 4106902,
                    nome: "Curitiba".to_string(),
                },
                Municipality {
                    id: 4113700,
                    nome: "Londrina".to_string(),
                },
            ]),
            42 => Ok(vec![Municipality {
                id: 4205407,
                nome: "Florianópolis".to_string(),
            }]),
            other => Err(Error::Upstream {
                message: format!("stub divisions has no state {other}"),
            }),
        }
    }
}

/// State wired to the given geocoder and the stub divisions provider.
///
/// Retries are disabled and the timeout is short so failure tests are fast.
pub fn test_state_with(geocoder: Arc<StubGeocoder>) -> AppState {
    let lookup = GeoLookup::new(geocoder, Arc::new(LruCoordinateCache::new(64)))
        .with_timeout(Duration::from_secs(1))
        .with_retry_policy(RetryPolicy::no_retry());
    let estimator = TripEstimator::new(lookup, &EstimatorConfig::default());
    AppState::from_components(estimator, Arc::new(StubDivisions))
}

/// State wired to a fresh [`StubGeocoder`].
pub fn test_state() -> AppState {
    test_state_with(Arc::new(StubGeocoder::new()))
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_geocoder_resolves_fixtures() {
        let geocoder = StubGeocoder::new();
        let (city, state) = fixture_places::CURITIBA;

        let coordinate = geocoder.geocode(&PlaceKey::new(city, state)).await.unwrap();
        assert_eq!(coordinate.latitude(), -25.4284);
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_geocoder_fails_upstream() {
        let geocoder = StubGeocoder::unavailable();
        let err = geocoder
            .geocode(&PlaceKey::new("Curitiba", "Paraná"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_stub_divisions_unknown_state_fails() {
        assert!(StubDivisions.municipalities(99).await.is_err());
        assert_eq!(StubDivisions.states().await.unwrap().len(), 2);
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
