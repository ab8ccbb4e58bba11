//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::domain::DomainError;

use super::state::AppState;

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check with store verification
///
/// The service can answer without the persistent store, so only an
/// unreachable cache store makes it unready.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let cache = state.facade.cache_store();
    let cache_check = timed_check(
        "cache_store",
        Some(cache.backend()),
        cache.ping().await,
        start,
        HealthStatus::Unhealthy,
    );

    let persistent_start = Instant::now();
    let persistent_check = match state.facade.persistent_store() {
        Some(store) => timed_check(
            "persistent_store",
            Some(store.backend()),
            store.ping().await,
            persistent_start,
            HealthStatus::Degraded,
        ),
        None => HealthCheck {
            name: "persistent_store".to_string(),
            status: HealthStatus::Degraded,
            backend: None,
            message: Some("Persistent store disabled".to_string()),
            latency_ms: None,
        },
    };

    let overall_status = overall_status(&[cache_check.status, persistent_check.status]);
    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![cache_check, persistent_check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK, // Still accept requests
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check - simple check to verify the service is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn timed_check(
    name: &str,
    backend: Option<&str>,
    result: Result<(), DomainError>,
    start: Instant,
    failure_status: HealthStatus,
) -> HealthCheck {
    let (status, message) = match result {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => (failure_status, Some(e.to_string())),
    };

    HealthCheck {
        name: name.to_string(),
        status,
        backend: backend.map(str::to_string),
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

fn overall_status(statuses: &[HealthStatus]) -> HealthStatus {
    if statuses.contains(&HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if statuses.contains(&HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_overall_status() {
        use HealthStatus::*;

        assert_eq!(overall_status(&[Healthy, Healthy]), Healthy);
        assert_eq!(overall_status(&[Healthy, Degraded]), Degraded);
        assert_eq!(overall_status(&[Unhealthy, Degraded]), Unhealthy);
    }

    #[test]
    fn test_health_response_with_checks() {
        let response = HealthResponse {
            status: HealthStatus::Degraded,
            version: "1.0.0".to_string(),
            checks: Some(vec![
                timed_check(
                    "cache_store",
                    Some("redis"),
                    Ok(()),
                    Instant::now(),
                    HealthStatus::Unhealthy,
                ),
                timed_check(
                    "persistent_store",
                    Some("postgres"),
                    Err(DomainError::storage("Connection refused")),
                    Instant::now(),
                    HealthStatus::Degraded,
                ),
            ]),
            latency_ms: Some(105),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"cache_store\""));
        assert!(json.contains("\"backend\":\"postgres\""));
        assert!(json.contains("Connection refused"));
    }
}
