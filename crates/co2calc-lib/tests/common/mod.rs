//! Shared stubs for integration tests.
//!
//! `StubGeocoder` answers from a fixed table of places and counts every call
//! so tests can assert on cache behavior without touching the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use co2calc_lib::{
    Coordinate, Error, GeoLookup, GeocodingProvider, LruCoordinateCache, PlaceKey, Result,
    RetryPolicy,
};

pub fn curitiba() -> PlaceKey {
    PlaceKey::new("Curitiba", "Paraná")
}

pub fn florianopolis() -> PlaceKey {
    PlaceKey::new("Florianópolis", "Santa Catarina")
}

#[allow(dead_code)]
pub fn sao_paulo() -> PlaceKey {
    PlaceKey::new("São Paulo", "SP")
}

#[allow(dead_code)]
pub fn rio() -> PlaceKey {
    PlaceKey::new("Rio de Janeiro", "RJ")
}

/// Coordinates as returned by Nominatim for the fixture places.
pub fn fixture_places() -> HashMap<PlaceKey, Coordinate> {
    HashMap::from([
        (curitiba(), Coordinate::new(-25.4284, -49.2733).unwrap()),
        (florianopolis(), Coordinate::new(-27.5954, -48.5480).unwrap()),
        (sao_paulo(), Coordinate::new(-23.55, -46.63).unwrap()),
        (rio(), Coordinate::new(-22.91, -43.17).unwrap()),
    ])
}

pub struct StubGeocoder {
    places: HashMap<PlaceKey, Coordinate>,
    transient_failures: AtomicUsize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self {
            places: fixture_places(),
            transient_failures: AtomicUsize::new(0),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the first `count` calls with an upstream error.
    #[allow(dead_code)]
    pub fn failing_first(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingProvider for StubGeocoder {
    async fn geocode(&self, place: &PlaceKey) -> Result<Coordinate> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Upstream {
                message: "stub provider unavailable".to_string(),
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

/// A lookup over `provider` with fast retries so failure tests stay quick.
pub fn lookup_with(provider: Arc<StubGeocoder>, capacity: usize) -> GeoLookup {
    GeoLookup::new(provider, Arc::new(LruCoordinateCache::new(capacity))).with_retry_policy(
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        },
    )
}
