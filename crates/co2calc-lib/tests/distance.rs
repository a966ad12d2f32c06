use co2calc_lib::{round2, Coordinate, DistanceEstimator, EstimatorConfig};

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid coordinate")
}

#[test]
fn estimate_is_symmetric() {
    let estimator = DistanceEstimator::default();
    let curitiba = coord(-25.4284, -49.2733);
    let floripa = coord(-27.5954, -48.5480);

    assert_eq!(
        estimator.estimate(curitiba, floripa),
        estimator.estimate(floripa, curitiba)
    );
}

#[test]
fn identical_points_are_zero() {
    let estimator = DistanceEstimator::default();
    let point = coord(-23.55, -46.63);
    let estimate = estimator.estimate(point, point);

    assert_eq!(estimate.straight_line_km, 0.0);
    assert_eq!(estimate.road_km, 0.0);
}

#[test]
fn sao_paulo_to_rio() {
    let estimator = DistanceEstimator::default();
    let estimate = estimator.estimate(coord(-23.55, -46.63), coord(-22.91, -43.17));

    assert!(
        (355.0..=362.0).contains(&estimate.straight_line_km),
        "straight line was {}",
        estimate.straight_line_km
    );
    assert!(
        (444.0..=452.0).contains(&estimate.road_km),
        "road was {}",
        estimate.road_km
    );
    assert_eq!(estimate.road_km, round2(estimate.straight_line_km * 1.25));
    assert_eq!(estimate.correction_factor, 1.25);
}

#[test]
fn custom_radius_scales_distance() {
    let config = EstimatorConfig {
        earth_radius_km: 3185.5,
        ..EstimatorConfig::default()
    };
    let half = DistanceEstimator::new(&config).estimate(coord(0.0, 0.0), coord(10.0, 0.0));
    let full = DistanceEstimator::default().estimate(coord(0.0, 0.0), coord(10.0, 0.0));

    assert!((full.straight_line_km - 2.0 * half.straight_line_km).abs() <= 0.02);
}
