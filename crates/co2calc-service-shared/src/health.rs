//! Health check handlers for Kubernetes probes.
//!
//! Readiness reports local state (the geocoding cache) and always answers
//! 200; external providers are not probed.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator, always "ok" while the process can answer.
    pub status: String,

    pub service: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_entries: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            cache_entries: None,
            cache_capacity: None,
            started_at: None,
        }
    }

    pub fn ready(service: &str, version: &str, state: &AppState) -> Self {
        Self {
            cache_entries: Some(state.cache_entries()),
            cache_capacity: Some(state.cache_capacity()),
            started_at: Some(state.started_at()),
            ..Self::alive(service, version)
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"co2calc-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"co2calc-service-shared","version":"0.1.0","cache_entries":12,"cache_capacity":1024,"started_at":"..."}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let status = HealthStatus::ready(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &state);
    (StatusCode::OK, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("test-service", "1.0.0");
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "test-service");
        assert!(status.cache_entries.is_none());
    }

    #[test]
    fn test_health_status_ready() {
        let status = HealthStatus::ready("test-service", "1.0.0", &test_state());
        assert_eq!(status.status, "ok");
        assert_eq!(status.cache_entries, Some(0));
        assert_eq!(status.cache_capacity, Some(64));
        assert!(status.started_at.is_some());
    }

    #[tokio::test]
    async fn test_health_ready_returns_ok() {
        let response = health_ready(State(test_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::alive("co2calc", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("cache_entries"));
    }
}
