//! Health endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Check metadata store and file store availability.
///
/// Unauthenticated, for load balancers and container probes. Failures are
/// logged and reported only as `unavailable`.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let metadata = state.metadata.health_check().await;
    let files = state.files.health_check().await;

    let status = match (metadata, files) {
        (Ok(()), Ok(())) => "ok",
        (metadata, files) => {
            if let Err(e) = metadata {
                tracing::error!(error = %e, "metadata store health check failed");
            }
            if let Err(e) = files {
                tracing::error!(error = %e, "file store health check failed");
            }
            "unavailable"
        }
    };

    let code = if status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
