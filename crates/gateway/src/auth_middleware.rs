use {
    axum::{
        extract::State,
        http::{StatusCode, header},
        middleware::Next,
        response::{IntoResponse, Json, Response},
    },
    secrecy::ExposeSecret,
    serde_json::json,
    tracing::debug,
};

use crate::server::AppState;

/// Guard for operational endpoints. Accepts `Authorization: Bearer <token>`
/// matching `server.api_token`. Without a configured token every request is
/// rejected.
pub async fn require_auth(
    State(state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.gateway.api_token.as_ref() else {
        debug!(path = %request.uri().path(), "no api token configured, rejecting");
        return unauthorized();
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = presented
        && constant_time_eq(token.as_bytes(), expected.expose_secret().as_bytes())
    {
        return next.run(request).await;
    }

    unauthorized()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "not authenticated" })),
    )
        .into_response()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
