use {
    axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    serde_json::json,
    tracing::{error, warn},
};

/// Request-level failure, rendered as `{error}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The caller sent something we could not decode.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Decoding, delivery or initialization failed inside a transport.
    #[error(transparent)]
    Channel(#[from] vocalis_channels::Error),

    /// The selected capability failed or produced an unusable result.
    #[error(transparent)]
    Dispatch(#[from] vocalis_auto_reply::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Channel(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Channel(_) | Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("invalid JSON body: {err}"))
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "rejected request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, vocalis_common::BlockId};

    #[test]
    fn decode_failures_map_to_bad_request() {
        let err = GatewayError::from(vocalis_channels::Error::invalid_input("no chat"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            GatewayError::from(serde_err).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn delivery_and_dispatch_failures_map_to_500() {
        let delivery = GatewayError::from(vocalis_channels::Error::unavailable("bot down"));
        assert_eq!(delivery.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let dispatch = GatewayError::from(vocalis_auto_reply::Error::BlockNotFound {
            capability: "speech".into(),
            id: BlockId::new(),
        });
        assert_eq!(dispatch.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = GatewayError::NotFound("no such block".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
