//! Request types and validation for HTTP endpoints.
//!
//! Field names are camelCase; the Portuguese names used by the original web
//! form (`origemCidade`, `destinoEstado`, ...) are accepted as aliases.

use serde::{Deserialize, Serialize};

use co2calc_lib::{PlaceKey, TransportMode, TripRequest};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for estimating the road distance between two places.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRequest {
    #[serde(default, alias = "origemCidade")]
    pub origin_city: String,

    #[serde(default, alias = "origemEstado")]
    pub origin_state: String,

    #[serde(default, alias = "destinoCidade")]
    pub dest_city: String,

    #[serde(default, alias = "destinoEstado")]
    pub dest_state: String,
}

impl DistanceRequest {
    pub fn origin(&self) -> PlaceKey {
        PlaceKey::new(&self.origin_city, &self.origin_state)
    }

    pub fn destination(&self) -> PlaceKey {
        PlaceKey::new(&self.dest_city, &self.dest_state)
    }
}

impl Validate for DistanceRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let fields = [
            ("originCity", &self.origin_city),
            ("originState", &self.origin_state),
            ("destCity", &self.dest_city),
            ("destState", &self.dest_state),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                format!(
                    "Origin and destination city and state are required; missing: {}",
                    missing.join(", ")
                ),
                request_id,
            )));
        }

        Ok(())
    }
}

/// Request for computing the emissions of a trip.
///
/// Either `distance` (km) or all four place fields must be supplied. When
/// both are present the explicit distance wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(default)]
    pub transport: String,

    #[serde(default, alias = "origemCidade", skip_serializing_if = "Option::is_none")]
    pub origin_city: Option<String>,

    #[serde(default, alias = "origemEstado", skip_serializing_if = "Option::is_none")]
    pub origin_state: Option<String>,

    #[serde(default, alias = "destinoCidade", skip_serializing_if = "Option::is_none")]
    pub dest_city: Option<String>,

    #[serde(default, alias = "destinoEstado", skip_serializing_if = "Option::is_none")]
    pub dest_state: Option<String>,
}

impl CalculateRequest {
    /// Convert to the library request. Place pairs with a blank half are dropped.
    pub fn to_trip_request(&self) -> TripRequest {
        TripRequest {
            distance_km: self.distance,
            transport: self.transport.clone(),
            origin: place(&self.origin_city, &self.origin_state),
            destination: place(&self.dest_city, &self.dest_state),
        }
    }

    fn has_places(&self) -> bool {
        place(&self.origin_city, &self.origin_state).is_some()
            && place(&self.dest_city, &self.dest_state).is_some()
    }
}

impl Validate for CalculateRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.transport.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                format!(
                    "The 'transport' field is required; choose one of: {}",
                    TransportMode::keys().collect::<Vec<_>>().join(", ")
                ),
                request_id,
            )));
        }

        let has_distance = self
            .distance
            .is_some_and(|distance| distance.is_finite() && distance > 0.0);
        if !has_distance && !self.has_places() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Distance must be a number greater than zero, or origin and destination must be provided",
                request_id,
            )));
        }

        Ok(())
    }
}

fn place(city: &Option<String>, state: &Option<String>) -> Option<PlaceKey> {
    match (city.as_deref(), state.as_deref()) {
        (Some(city), Some(state)) if !city.trim().is_empty() && !state.trim().is_empty() => {
            Some(PlaceKey::new(city, state))
        }
        _ => None,
    }
}
