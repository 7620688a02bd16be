//! HTTP request metrics.

#[cfg(feature = "metrics")]
use std::time::Instant;

#[cfg(feature = "metrics")]
use {
    axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response},
    vocalis_metrics::{counter, gauge, histogram, http as http_metrics, labels},
};

/// Counts, times and tracks in-flight requests per route.
///
/// Labels use the matched route template (`/block/{id}`), never the raw
/// path, so block ids do not create new series.
#[cfg(feature = "metrics")]
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = endpoint_label(request.extensions().get::<MatchedPath>());

    gauge!(http_metrics::REQUESTS_IN_FLIGHT, labels::ENDPOINT => endpoint.clone())
        .increment(1.0);

    let response = next.run(request).await;
    let status = response.status().as_u16().to_string();

    counter!(
        http_metrics::REQUESTS_TOTAL,
        labels::ENDPOINT => endpoint.clone(),
        labels::METHOD => method.clone(),
        labels::STATUS => status.clone()
    )
    .increment(1);
    histogram!(
        http_metrics::REQUEST_DURATION_SECONDS,
        labels::ENDPOINT => endpoint.clone(),
        labels::METHOD => method,
        labels::STATUS => status
    )
    .record(start.elapsed().as_secs_f64());
    gauge!(http_metrics::REQUESTS_IN_FLIGHT, labels::ENDPOINT => endpoint).decrement(1.0);

    response
}

#[cfg(feature = "metrics")]
fn endpoint_label(matched: Option<&MatchedPath>) -> String {
    matched
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}
