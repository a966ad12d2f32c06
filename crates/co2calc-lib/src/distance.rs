use serde::Serialize;

use crate::config::{EstimatorConfig, DEFAULT_EARTH_RADIUS_KM};
use crate::coordinate::Coordinate;
use crate::numeric::round2;

/// Great-circle distance between two coordinates on a sphere of the given
/// radius, unrounded.
pub fn haversine_km(a: Coordinate, b: Coordinate, radius_km: f64) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * radius_km * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Straight-line and corrected road distance between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceEstimate {
    pub straight_line_km: f64,
    pub road_km: f64,
    pub correction_factor: f64,
}

/// Approximates road distance as great-circle distance times a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimator {
    earth_radius_km: f64,
    correction_factor: f64,
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

impl DistanceEstimator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            earth_radius_km: config.earth_radius_km,
            correction_factor: config.road_correction_factor,
        }
    }

    pub fn correction_factor(&self) -> f64 {
        self.correction_factor
    }

    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Both distances are rounded to two decimals; the road figure is derived
    /// from the already-rounded straight-line figure.
    pub fn estimate(&self, a: Coordinate, b: Coordinate) -> DistanceEstimate {
        let radius = if self.earth_radius_km > 0.0 {
            self.earth_radius_km
        } else {
            DEFAULT_EARTH_RADIUS_KM
        };
        let straight_line_km = round2(haversine_km(a, b, radius));
        DistanceEstimate {
            straight_line_km,
            road_km: round2(straight_line_km * self.correction_factor),
            correction_factor: self.correction_factor,
        }
    }
}
