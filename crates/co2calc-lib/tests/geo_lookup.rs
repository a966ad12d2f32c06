mod common;

use std::sync::Arc;
use std::time::Duration;

use co2calc_lib::{Error, PlaceKey, RetryPolicy};

use common::{curitiba, fixture_places, florianopolis, lookup_with, rio, sao_paulo, StubGeocoder};

#[tokio::test]
async fn repeated_resolve_hits_provider_once() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider.clone(), 8);

    let first = lookup.resolve("Curitiba", "Paraná").await.expect("resolves");
    let second = lookup.resolve("Curitiba", "Paraná").await.expect("resolves");

    assert_eq!(first, second);
    assert_eq!(provider.calls(), 1);
    assert_eq!(lookup.cache().len(), 1);
}

#[tokio::test]
async fn lookup_reports_cache_hits() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider, 8);

    let miss = lookup.lookup(&curitiba()).await.unwrap();
    let hit = lookup.lookup(&curitiba()).await.unwrap();

    assert!(!miss.cached);
    assert!(hit.cached);
    assert_eq!(miss.coordinate, hit.coordinate);
}

#[tokio::test]
async fn cache_keys_are_case_sensitive() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider.clone(), 8);

    lookup.lookup(&curitiba()).await.unwrap();
    let err = lookup
        .lookup(&PlaceKey::new("curitiba", "Paraná"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn evicted_entries_are_fetched_again() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider.clone(), 1);

    lookup.lookup(&curitiba()).await.unwrap();
    lookup.lookup(&florianopolis()).await.unwrap();
    lookup.lookup(&curitiba()).await.unwrap();

    assert_eq!(provider.calls(), 3);
    assert_eq!(lookup.cache().len(), 1);
}

#[tokio::test]
async fn not_found_is_not_retried_or_cached() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider.clone(), 8);

    let err = lookup.resolve("Atlantis", "XX").await.unwrap_err();

    assert!(matches!(err, Error::NotFound { ref query } if query.contains("Atlantis")));
    assert!(err.is_geocoding_failure());
    assert_eq!(provider.calls(), 1);
    assert!(lookup.cache().is_empty());
}

#[tokio::test]
async fn upstream_failures_are_retried() {
    let provider = Arc::new(StubGeocoder::new().failing_first(2));
    let lookup = lookup_with(provider.clone(), 8);

    let coordinate = lookup.resolve("Curitiba", "Paraná").await.expect("third attempt succeeds");

    assert_eq!(coordinate.latitude(), -25.4284);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn retries_stop_at_max_attempts() {
    let provider = Arc::new(StubGeocoder::new().failing_first(10));
    let lookup = lookup_with(provider.clone(), 8);

    let err = lookup.resolve("Curitiba", "Paraná").await.unwrap_err();

    assert!(matches!(err, Error::Upstream { .. }));
    assert_eq!(provider.calls(), 3);
    assert!(lookup.cache().is_empty());
}

#[tokio::test]
async fn slow_provider_times_out_as_upstream() {
    let provider = Arc::new(StubGeocoder::new().with_delay(Duration::from_millis(500)));
    let lookup = lookup_with(provider.clone(), 8)
        .with_timeout(Duration::from_millis(20))
        .with_retry_policy(RetryPolicy::no_retry());

    let err = lookup.resolve("Curitiba", "Paraná").await.unwrap_err();

    match err {
        Error::Upstream { message } => assert!(message.contains("timed out"), "{message}"),
        other => panic!("expected upstream timeout, got {other:?}"),
    }
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn blank_fields_fail_before_network() {
    let provider = Arc::new(StubGeocoder::new());
    let lookup = lookup_with(provider.clone(), 8);

    let err = lookup.resolve("  ", "Paraná").await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lookups_share_the_cache() {
    const REQUESTS: usize = 32;

    let provider = Arc::new(StubGeocoder::new().with_delay(Duration::from_millis(2)));
    let lookup = lookup_with(provider.clone(), 8);
    let places = [curitiba(), florianopolis(), sao_paulo(), rio()];
    let expected = fixture_places();

    let handles: Vec<_> = (0..REQUESTS)
        .map(|i| {
            let lookup = lookup.clone();
            let place = places[i % places.len()].clone();
            tokio::spawn(async move { lookup.lookup(&place).await })
        })
        .collect();

    for handle in handles {
        let resolved = handle.await.expect("task completes").expect("resolves");
        assert_eq!(resolved.coordinate, expected[&resolved.place]);
    }

    assert_eq!(lookup.cache().len(), places.len());
    let calls = provider.calls();
    assert!(calls >= places.len(), "calls was {calls}");
    assert!(calls <= REQUESTS, "calls was {calls}");
}
