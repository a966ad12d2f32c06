//! Application state for the HTTP service.
//!
//! Holds the trip estimator (with its geocoding cache) and the
//! administrative-division provider shared by all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use co2calc_lib::{
    DivisionProvider, DivisionsConfig, Error as LibError, EstimatorConfig, GeocoderConfig,
    IbgeClient, TripEstimator,
};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to build the geocoding client.
    Geocoder(LibError),

    /// Failed to build the administrative-division client.
    Divisions(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geocoder(e) => write!(f, "failed to initialize geocoder: {}", e),
            Self::Divisions(e) => write!(f, "failed to initialize divisions client: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geocoder(e) | Self::Divisions(e) => Some(e),
        }
    }
}

/// Library configuration gathered from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    pub estimator: EstimatorConfig,
    pub geocoder: GeocoderConfig,
    pub divisions: DivisionsConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            estimator: EstimatorConfig::from_env(),
            geocoder: GeocoderConfig::from_env(),
            divisions: DivisionsConfig::from_env(),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use co2calc_service_shared::{AppState, ServiceConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let estimator = state.estimator();
///     // ... estimate a trip
/// }
///
/// let state = AppState::from_config(&ServiceConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/calculate", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    estimator: TripEstimator,
    divisions: Arc<dyn DivisionProvider>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Build production state: Nominatim geocoding and the IBGE client.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let estimator = TripEstimator::from_config(&config.estimator, &config.geocoder)
            .map_err(AppStateError::Geocoder)?;
        tracing::info!(
            geocoder = %config.geocoder.base_url,
            cache_capacity = config.geocoder.cache_capacity,
            timeout_ms = config.geocoder.timeout.as_millis() as u64,
            "geocoder configured"
        );

        let divisions = IbgeClient::new(&config.divisions).map_err(AppStateError::Divisions)?;
        tracing::info!(divisions = %config.divisions.base_url, "divisions client configured");

        Ok(Self::from_components(estimator, Arc::new(divisions)))
    }

    /// Create application state from pre-built components.
    ///
    /// This is useful for testing with stub providers.
    pub fn from_components(
        estimator: TripEstimator,
        divisions: Arc<dyn DivisionProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                estimator,
                divisions,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn estimator(&self) -> &TripEstimator {
        &self.inner.estimator
    }

    pub fn divisions(&self) -> &dyn DivisionProvider {
        self.inner.divisions.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Entries currently held by the geocoding cache.
    pub fn cache_entries(&self) -> usize {
        self.inner.estimator.geo().cache().len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.inner.estimator.geo().cache().capacity()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache_entries", &self.cache_entries())
            .field("cache_capacity", &self.cache_capacity())
            .field("started_at", &self.inner.started_at)
            .finish()
    }
}
