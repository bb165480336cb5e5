//! HTTP-facing error type shared by the route handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::classifier::PredictionError;

// ---

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or non-numeric form field. Detail is logged, not returned.
    #[error("invalid form input")]
    InvalidInput,

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("failed to read records: {0}")]
    Store(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "status": status.as_u16(),
            })),
        )
            .into_response()
    }
}
