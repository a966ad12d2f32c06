use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{GeocoderConfig, DEFAULT_GEOCODER_TIMEOUT};
use crate::coordinate::{Coordinate, PlaceKey};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

use super::cache::{CoordinateCache, LruCoordinateCache};
use super::provider::{GeocodingProvider, NominatimProvider};

/// A place together with its coordinate and whether it came from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlace {
    pub place: PlaceKey,
    pub coordinate: Coordinate,
    #[serde(skip)]
    pub cached: bool,
}

/// Resolves city/state pairs to coordinates, caching successful answers.
///
/// Cloning is cheap: the provider and cache are shared.
#[derive(Clone)]
pub struct GeoLookup {
    provider: Arc<dyn GeocodingProvider>,
    cache: Arc<dyn CoordinateCache>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeoLookup {
    pub fn new(provider: Arc<dyn GeocodingProvider>, cache: Arc<dyn CoordinateCache>) -> Self {
        Self {
            provider,
            cache,
            timeout: DEFAULT_GEOCODER_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Nominatim provider plus an LRU cache sized from the config.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        let provider = NominatimProvider::new(config)?;
        let cache = LruCoordinateCache::new(config.cache_capacity);
        Ok(Self::new(Arc::new(provider), Arc::new(cache))
            .with_timeout(config.timeout)
            .with_retry_policy(config.retry.clone()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<dyn CoordinateCache> {
        &self.cache
    }

    /// Convenience wrapper around [`GeoLookup::lookup`] returning only the coordinate.
    pub async fn resolve(&self, city: &str, state: &str) -> Result<Coordinate> {
        let place = PlaceKey::new(city, state);
        self.lookup(&place).await.map(|resolved| resolved.coordinate)
    }

    #[tracing::instrument(level = "debug", skip(self, place), fields(place = %place))]
    pub async fn lookup(&self, place: &PlaceKey) -> Result<ResolvedPlace> {
        place.validate()?;

        if let Some(coordinate) = self.cache.get(place) {
            debug!("geocode cache hit");
            return Ok(ResolvedPlace {
                place: place.clone(),
                coordinate,
                cached: true,
            });
        }

        let coordinate = self.fetch_with_retry(place).await?;
        self.cache.insert(place.clone(), coordinate);
        info!(
            provider = self.provider.name(),
            latitude = coordinate.latitude(),
            longitude = coordinate.longitude(),
            "resolved place"
        );

        Ok(ResolvedPlace {
            place: place.clone(),
            coordinate,
            cached: false,
        })
    }

    async fn fetch_with_retry(&self, place: &PlaceKey) -> Result<Coordinate> {
        let attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            let start = Instant::now();
            let result = match tokio::time::timeout(self.timeout, self.provider.geocode(place)).await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Upstream {
                    message: format!(
                        "geocoding provider timed out after {} ms",
                        self.timeout.as_millis()
                    ),
                }),
            };

            match result {
                Ok(coordinate) => return Ok(coordinate),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "geocoding attempt failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "geocoding failed");
                    return Err(err);
                }
            }
        }
    }
}

impl fmt::Debug for GeoLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoLookup")
            .field("provider", &self.provider.name())
            .field("cache_len", &self.cache.len())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}
