mod common;

use std::sync::Arc;

use co2calc_lib::{
    round2, DistanceSource, Error, EstimatorConfig, PlaceKey, TransportMode, TripEstimator,
    TripRequest,
};

use common::{curitiba, florianopolis, lookup_with, StubGeocoder};

fn estimator(provider: Arc<StubGeocoder>) -> TripEstimator {
    TripEstimator::new(lookup_with(provider, 16), &EstimatorConfig::default())
}

#[tokio::test]
async fn geocoded_trip_uses_road_distance() {
    let provider = Arc::new(StubGeocoder::new());
    let estimator = estimator(provider.clone());

    let request = TripRequest::between(curitiba(), florianopolis(), "car");
    let trip = estimator.estimate(&request).await.expect("estimate succeeds");

    assert_eq!(trip.source, DistanceSource::Geocoded);
    let route = trip.route.as_ref().expect("route present");
    assert!(trip.distance_km() > 0.0);
    assert_eq!(trip.distance_km(), route.estimate.road_km);
    assert_eq!(
        route.estimate.road_km,
        round2(route.estimate.straight_line_km * 1.25)
    );
    assert_eq!(trip.emission.emission_kg, round2(trip.distance_km() * 0.21));
    assert_eq!(trip.emission.mode, TransportMode::Car);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn manual_distance_skips_geocoding() {
    let provider = Arc::new(StubGeocoder::new());
    let estimator = estimator(provider.clone());

    let request = TripRequest {
        distance_km: Some(100.0),
        transport: "truck".to_string(),
        origin: Some(curitiba()),
        destination: Some(florianopolis()),
    };
    let trip = estimator.estimate(&request).await.unwrap();

    assert_eq!(trip.source, DistanceSource::Manual);
    assert!(trip.route.is_none());
    assert_eq!(trip.emission.emission_kg, 27.0);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn zero_distance_falls_through_to_geocoding() {
    let provider = Arc::new(StubGeocoder::new());
    let estimator = estimator(provider.clone());

    let request = TripRequest {
        distance_km: Some(0.0),
        ..TripRequest::between(curitiba(), florianopolis(), "bus")
    };
    let trip = estimator.estimate(&request).await.unwrap();

    assert_eq!(trip.source, DistanceSource::Geocoded);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn missing_distance_and_places_is_invalid_distance() {
    let estimator = estimator(Arc::new(StubGeocoder::new()));

    let request = TripRequest {
        transport: "car".to_string(),
        origin: Some(curitiba()),
        ..TripRequest::default()
    };
    let err = estimator.estimate(&request).await.unwrap_err();

    assert!(matches!(err, Error::InvalidDistance { .. }));
}

#[tokio::test]
async fn invalid_mode_is_reported_before_geocoding() {
    let provider = Arc::new(StubGeocoder::new());
    let estimator = estimator(provider.clone());

    let request = TripRequest::between(curitiba(), florianopolis(), "airplane");
    let err = estimator.estimate(&request).await.unwrap_err();

    assert!(matches!(err, Error::InvalidMode { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unknown_place_is_a_geocoding_failure() {
    let estimator = estimator(Arc::new(StubGeocoder::new()));

    let request = TripRequest::between(curitiba(), PlaceKey::new("Atlantis", "XX"), "car");
    let err = estimator.estimate(&request).await.unwrap_err();

    assert!(err.is_geocoding_failure());
}

#[tokio::test]
async fn repeated_trips_reuse_cached_coordinates() {
    let provider = Arc::new(StubGeocoder::new());
    let estimator = estimator(provider.clone());

    let request = TripRequest::between(curitiba(), florianopolis(), "car");
    let first = estimator.estimate(&request).await.unwrap();
    let second = estimator.estimate(&request).await.unwrap();

    assert_eq!(first.distance_km(), second.distance_km());
    assert_eq!(provider.calls(), 2);
    let route = second.route.unwrap();
    assert!(route.origin.cached && route.destination.cached);
}

#[tokio::test]
async fn same_origin_and_destination_is_a_validation_error() {
    let estimator = estimator(Arc::new(StubGeocoder::new()));

    let request = TripRequest::between(curitiba(), curitiba(), "car");
    let err = estimator.estimate(&request).await.unwrap_err();

    assert!(matches!(err, Error::Validation { ref message } if message.contains("same place")));
    assert!(!err.is_geocoding_failure());
}
