//! Prometheus scrape endpoint.

#[cfg(feature = "prometheus")]
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

#[cfg(feature = "prometheus")]
use crate::server::AppState;

/// `GET /metrics`: Prometheus text exposition format.
///
/// Unauthenticated so scrapers need no credentials; it exposes counters
/// only, never message content.
#[cfg(feature = "prometheus")]
pub async fn prometheus_metrics_handler(State(state): State<AppState>) -> Response {
    match state.gateway.metrics_handle.as_ref() {
        Some(handle) => (
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics not enabled",
        )
            .into_response(),
    }
}
