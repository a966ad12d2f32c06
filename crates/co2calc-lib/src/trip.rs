//! End-to-end trip estimation: pick or derive a distance, then compute emissions.
//!
//! [`TripEstimator`] is the single orchestration point shared by the HTTP
//! service and the CLI. A caller-supplied distance always wins; otherwise both
//! places are geocoded concurrently and the corrected road distance is used.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{EstimatorConfig, GeocoderConfig};
use crate::coordinate::PlaceKey;
use crate::distance::{DistanceEstimate, DistanceEstimator};
use crate::emission::{EmissionCalculator, EmissionResult};
use crate::error::{Error, Result};
use crate::geo::{GeoLookup, ResolvedPlace};
use crate::transport::TransportMode;

/// Where the distance used for a trip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSource {
    Manual,
    Geocoded,
}

impl DistanceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceSource::Manual => "manual",
            DistanceSource::Geocoded => "geocoded",
        }
    }
}

/// Inputs for one estimate. `transport` is parsed by the estimator so that
/// unknown modes are reported uniformly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripRequest {
    pub distance_km: Option<f64>,
    pub transport: String,
    pub origin: Option<PlaceKey>,
    pub destination: Option<PlaceKey>,
}

impl TripRequest {
    pub fn manual(distance_km: f64, transport: impl Into<String>) -> Self {
        Self {
            distance_km: Some(distance_km),
            transport: transport.into(),
            ..Self::default()
        }
    }

    pub fn between(
        origin: PlaceKey,
        destination: PlaceKey,
        transport: impl Into<String>,
    ) -> Self {
        Self {
            distance_km: None,
            transport: transport.into(),
            origin: Some(origin),
            destination: Some(destination),
        }
    }

    fn usable_distance(&self) -> Option<f64> {
        self.distance_km
            .filter(|distance| distance.is_finite() && *distance > 0.0)
    }
}

/// Geocoded endpoints and the distance between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDistance {
    pub origin: ResolvedPlace,
    pub destination: ResolvedPlace,
    pub estimate: DistanceEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripEstimate {
    pub source: DistanceSource,
    pub route: Option<RouteDistance>,
    pub emission: EmissionResult,
}

impl TripEstimate {
    pub fn distance_km(&self) -> f64 {
        self.emission.distance_km
    }
}

#[derive(Debug, Clone)]
pub struct TripEstimator {
    geo: GeoLookup,
    distance: DistanceEstimator,
    emission: EmissionCalculator,
}

impl TripEstimator {
    pub fn new(geo: GeoLookup, config: &EstimatorConfig) -> Self {
        Self {
            geo,
            distance: DistanceEstimator::new(config),
            emission: EmissionCalculator::new(config),
        }
    }

    /// Production wiring: Nominatim-backed lookup with an LRU cache.
    pub fn from_config(estimator: &EstimatorConfig, geocoder: &GeocoderConfig) -> Result<Self> {
        Ok(Self::new(GeoLookup::from_config(geocoder)?, estimator))
    }

    pub fn geo(&self) -> &GeoLookup {
        &self.geo
    }

    /// Geocode both places concurrently and estimate the road distance.
    pub async fn road_distance(
        &self,
        origin: &PlaceKey,
        destination: &PlaceKey,
    ) -> Result<RouteDistance> {
        let (origin, destination) =
            tokio::join!(self.geo.lookup(origin), self.geo.lookup(destination));
        let (origin, destination) = (origin?, destination?);

        let estimate = self
            .distance
            .estimate(origin.coordinate, destination.coordinate);
        debug!(
            origin = %origin.place,
            destination = %destination.place,
            straight_line_km = estimate.straight_line_km,
            road_km = estimate.road_km,
            "estimated road distance"
        );

        Ok(RouteDistance {
            origin,
            destination,
            estimate,
        })
    }

    pub async fn estimate(&self, request: &TripRequest) -> Result<TripEstimate> {
        let mode: TransportMode = request.transport.parse()?;

        let (source, route, distance_km) = match (
            request.usable_distance(),
            &request.origin,
            &request.destination,
        ) {
            (Some(distance), _, _) => (DistanceSource::Manual, None, distance),
            (None, Some(origin), Some(destination)) => {
                let route = self.road_distance(origin, destination).await?;
                let distance = route.estimate.road_km;
                if distance <= 0.0 {
                    return Err(Error::validation(format!(
                        "origin and destination are the same place ({origin}); enter the distance manually"
                    )));
                }
                (DistanceSource::Geocoded, Some(route), distance)
            }
            (None, _, _) => {
                return Err(Error::InvalidDistance {
                    value: request.distance_km.unwrap_or(0.0),
                })
            }
        };

        let emission = self.emission.compute(distance_km, mode)?;
        info!(
            transport = %mode,
            source = source.as_str(),
            distance_km,
            emission_kg = emission.emission_kg,
            "trip estimated"
        );

        Ok(TripEstimate {
            source,
            route,
            emission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_distance_is_not_usable() {
        assert_eq!(TripRequest::manual(0.0, "car").usable_distance(), None);
        assert_eq!(TripRequest::manual(-5.0, "car").usable_distance(), None);
        assert_eq!(TripRequest::manual(12.5, "car").usable_distance(), Some(12.5));
    }

    #[test]
    fn source_labels() {
        assert_eq!(DistanceSource::Manual.as_str(), "manual");
        assert_eq!(DistanceSource::Geocoded.as_str(), "geocoded");
    }
}
