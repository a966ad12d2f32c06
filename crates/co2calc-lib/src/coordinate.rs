use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite values and anything outside
    /// `[-90, 90]` latitude or `[-180, 180]` longitude.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// A city/state pair used both as a geocoding query and as a cache key.
///
/// Values are kept exactly as given (after trimming surrounding whitespace),
/// so `"São Paulo"` and `"sao paulo"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceKey {
    city: String,
    state: String,
}

impl PlaceKey {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into().trim().to_string(),
            state: state.into().trim().to_string(),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Reject keys whose city or state is blank.
    pub fn validate(&self) -> Result<()> {
        if self.city.is_empty() {
            return Err(Error::validation("city must not be empty"));
        }
        if self.state.is_empty() {
            return Err(Error::validation("state must not be empty"));
        }
        Ok(())
    }

    /// Free-text query sent to the geocoding provider.
    pub fn query(&self, country: &str) -> String {
        if country.trim().is_empty() {
            format!("{}, {}", self.city, self.state)
        } else {
            format!("{}, {}, {}", self.city, self.state, country.trim())
        }
    }
}

impl fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state)
    }
}
