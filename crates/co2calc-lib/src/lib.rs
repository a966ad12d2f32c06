//! co2calc library entry points.
//!
//! This crate turns a trip description into a CO₂ estimate: it geocodes
//! origin and destination places, derives a road distance from the
//! great-circle distance, and applies per-mode emission factors. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

pub mod config;
pub mod coordinate;
pub mod distance;
pub mod divisions;
pub mod emission;
pub mod error;
pub mod geo;
mod numeric;
pub mod retry;
pub mod transport;
pub mod trip;

pub use config::{DivisionsConfig, EstimatorConfig, GeocoderConfig};
pub use coordinate::{Coordinate, PlaceKey};
pub use distance::{haversine_km, DistanceEstimate, DistanceEstimator};
pub use divisions::{BrazilianState, DivisionProvider, IbgeClient, Municipality};
pub use emission::{CarbonCredits, EmissionCalculator, EmissionResult, ModeEmission};
pub use error::{Error, Result};
pub use geo::{
    CoordinateCache, GeoLookup, GeocodingProvider, LruCoordinateCache, NominatimProvider,
    ResolvedPlace,
};
pub use numeric::round2;
pub use retry::RetryPolicy;
pub use transport::TransportMode;
pub use trip::{DistanceSource, RouteDistance, TripEstimate, TripEstimator, TripRequest};
