//! co2calc HTTP service.
//!
//! Thin axum handlers over `co2calc-lib`: parse, validate, call the trip
//! estimator, format the response.
//!
//! # Endpoints
//!
//! - `POST /calculate` - Emission estimate for a trip (manual or geocoded distance)
//! - `POST /calculate-distance` (alias `/api/calculate-distance`) - Road distance between two places
//! - `GET /emission-factors` - Canonical factor table
//! - `GET /api/estados` - Brazilian states
//! - `GET /api/municipios/{id}` - Municipalities of a state
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live`, `GET /health/ready` - Kubernetes probes

use std::any::Any;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use co2calc_lib::{
    BrazilianState, CarbonCredits, DistanceSource, Municipality, TransportMode, TripEstimate,
};
use co2calc_service_shared::{
    AppState, CalculateRequest, DistanceRequest, MetricsConfig, MetricsLayer, ProblemDetails,
    RequestId, ServiceResponse, Validate, extract_or_generate_request_id, failure_reason,
    from_lib_error, health_live, health_ready, metrics_handler, record_distance_calculated,
    record_estimate_calculated, record_estimate_failed, record_geocode_lookup,
};

const EMISSION_UNIT: &str = "kg CO2";

/// Routes without state or layers; see [`with_layers`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/calculate-distance", post(calculate_distance_handler))
        .route("/api/calculate-distance", post(calculate_distance_handler))
        .route("/emission-factors", get(emission_factors_handler))
        .route("/api/estados", get(states_handler))
        .route("/api/municipios/{id}", get(municipalities_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
}

/// Attach panic recovery, tracing, request-id/metrics middleware, and state.
pub fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}

/// The complete service router.
pub fn build_router(state: AppState, metrics: &MetricsConfig) -> Router {
    let mut routes = api_routes();
    if metrics.enabled {
        routes = routes.route(&metrics.path, get(metrics_handler));
    }
    with_layers(routes, state)
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug)]
enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DistanceResponse {
    /// Road distance under the name browser clients read; equals `distance_km`.
    distance: f64,
    distance_km: f64,
    straight_line_distance_km: f64,
    correction_factor: f64,
    origin: LatLon,
    destination: LatLon,
}

#[derive(Debug, Serialize)]
struct SelectedTransport {
    #[serde(rename = "type")]
    key: &'static str,
    name: &'static str,
    icon: &'static str,
    emission: f64,
    factor: f64,
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    key: &'static str,
    /// Display name, as shown in the comparison table.
    #[serde(rename = "type")]
    name: &'static str,
    icon: &'static str,
    emission: f64,
    factor: f64,
    selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    distance: f64,
    distance_source: DistanceSource,
    unit: &'static str,
    selected_transport: SelectedTransport,
    carbon_credits: CarbonCredits,
    comparison: Vec<ComparisonRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trees_needed: Option<u32>,
}

impl From<&TripEstimate> for CalculateResponse {
    fn from(trip: &TripEstimate) -> Self {
        let emission = &trip.emission;
        let mode = emission.mode;
        Self {
            distance: emission.distance_km,
            distance_source: trip.source,
            unit: EMISSION_UNIT,
            selected_transport: SelectedTransport {
                key: mode.key(),
                name: mode.display_name(),
                icon: mode.icon(),
                emission: emission.emission_kg,
                factor: emission.factor,
            },
            carbon_credits: emission.carbon_credits,
            comparison: emission
                .comparison
                .iter()
                .map(|row| ComparisonRow {
                    key: row.mode.key(),
                    name: row.mode.display_name(),
                    icon: row.mode.icon(),
                    emission: row.emission_kg,
                    factor: row.factor,
                    selected: row.selected,
                })
                .collect(),
            trees_needed: emission.trees_needed,
        }
    }
}

#[derive(Debug, Serialize)]
struct FactorTable {
    bike: f64,
    car: f64,
    bus: f64,
    truck: f64,
}

#[derive(Debug, Serialize)]
struct ModeInfo {
    key: &'static str,
    name: &'static str,
    icon: &'static str,
    factor: f64,
}

#[derive(Debug, Serialize)]
struct EmissionFactorsResponse {
    factors: FactorTable,
    modes: Vec<ModeInfo>,
    info: &'static str,
}

/// Handle POST /calculate requests.
async fn calculate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResponse<CalculateResponse> {
    let request_id = extract_or_generate_request_id(&headers);

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            record_estimate_failed("invalid_body", "calculate");
            return ApiResponse::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    info!(
        request_id = %request_id,
        transport = %request.transport,
        distance = ?request.distance,
        "handling calculate request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_estimate_failed("validation_error", "calculate");
        return ApiResponse::Error(*problem);
    }

    let trip = match state.estimator().estimate(&request.to_trip_request()).await {
        Ok(trip) => trip,
        Err(e) => return ApiResponse::Error(trip_failure(&e, &request_id, "calculate")),
    };

    if let Some(route) = &trip.route {
        record_geocode_lookup(route.origin.cached);
        record_geocode_lookup(route.destination.cached);
        record_distance_calculated(route.estimate.road_km);
    }
    record_estimate_calculated(trip.emission.mode.key(), trip.source.as_str());

    info!(
        request_id = %request_id,
        distance_km = trip.distance_km(),
        emission_kg = trip.emission.emission_kg,
        "emission calculated"
    );

    ApiResponse::Success(ServiceResponse::new(CalculateResponse::from(&trip)))
}

/// Handle POST /calculate-distance requests.
async fn calculate_distance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DistanceRequest>, JsonRejection>,
) -> ApiResponse<DistanceResponse> {
    let request_id = extract_or_generate_request_id(&headers);

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            record_estimate_failed("invalid_body", "calculate_distance");
            return ApiResponse::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_estimate_failed("validation_error", "calculate_distance");
        return ApiResponse::Error(*problem);
    }

    let origin = request.origin();
    let destination = request.destination();
    info!(
        request_id = %request_id,
        origin = %origin,
        destination = %destination,
        "handling distance request"
    );

    let route = match state.estimator().road_distance(&origin, &destination).await {
        Ok(route) => route,
        Err(e) => {
            return ApiResponse::Error(trip_failure(&e, &request_id, "calculate_distance"));
        }
    };

    record_geocode_lookup(route.origin.cached);
    record_geocode_lookup(route.destination.cached);
    record_distance_calculated(route.estimate.road_km);

    ApiResponse::Success(ServiceResponse::new(DistanceResponse {
        distance: route.estimate.road_km,
        distance_km: route.estimate.road_km,
        straight_line_distance_km: route.estimate.straight_line_km,
        correction_factor: route.estimate.correction_factor,
        origin: LatLon {
            lat: route.origin.coordinate.latitude(),
            lon: route.origin.coordinate.longitude(),
        },
        destination: LatLon {
            lat: route.destination.coordinate.latitude(),
            lon: route.destination.coordinate.longitude(),
        },
    }))
}

/// Handle GET /emission-factors requests.
async fn emission_factors_handler() -> Json<EmissionFactorsResponse> {
    Json(EmissionFactorsResponse {
        factors: FactorTable {
            bike: TransportMode::Bike.factor_kg_per_km(),
            car: TransportMode::Car.factor_kg_per_km(),
            bus: TransportMode::Bus.factor_kg_per_km(),
            truck: TransportMode::Truck.factor_kg_per_km(),
        },
        modes: TransportMode::ALL
            .iter()
            .map(|mode| ModeInfo {
                key: mode.key(),
                name: mode.display_name(),
                icon: mode.icon(),
                factor: mode.factor_kg_per_km(),
            })
            .collect(),
        info: "Emission factors in kg CO2 per km",
    })
}

/// Handle GET /api/estados requests.
async fn states_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let request_id = extract_or_generate_request_id(&headers);
    match state.divisions().states().await {
        Ok(states) => Json::<Vec<BrazilianState>>(states).into_response(),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to list states");
            ProblemDetails::upstream_unavailable(
                "The administrative divisions service is unavailable",
                request_id.as_str(),
            )
            .into_response()
        }
    }
}

/// Handle GET /api/municipios/{id} requests.
async fn municipalities_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    state_id: Result<Path<u32>, PathRejection>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    let Path(state_id) = match state_id {
        Ok(path) => path,
        Err(rejection) => {
            return ProblemDetails::bad_request(
                format!("Invalid state id: {}", rejection.body_text()),
                request_id.as_str(),
            )
            .into_response();
        }
    };

    match state.divisions().municipalities(state_id).await {
        Ok(cities) => Json::<Vec<Municipality>>(cities).into_response(),
        Err(e) => {
            error!(request_id = %request_id, state_id, error = %e, "failed to list municipalities");
            ProblemDetails::upstream_unavailable(
                "The administrative divisions service is unavailable",
                request_id.as_str(),
            )
            .into_response()
        }
    }
}

fn trip_failure(error: &co2calc_lib::Error, request_id: &RequestId, endpoint: &str) -> ProblemDetails {
    let reason = failure_reason(error);
    if error.is_geocoding_failure() {
        warn!(
            request_id = %request_id,
            reason,
            error = %error,
            "geocoding failed; asking client for manual distance"
        );
    } else {
        info!(request_id = %request_id, reason, error = %error, "request rejected");
    }
    record_estimate_failed(reason, endpoint);
    from_lib_error(error, request_id.as_str())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    // Only the panic payload reaches this hook, so the problem gets a fresh id.
    // The log line still runs inside the middleware's request span, and the
    // caller's id is echoed in `X-Request-ID`.
    let request_id = RequestId::generate();
    error!(problem_instance = %request_id, panic = message, "handler panicked");
    record_estimate_failed("internal_error", "any");
    ProblemDetails::internal_error(request_id.as_str()).into_response()
}
