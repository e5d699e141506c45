//! HTTP rendering of inference failures.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use inference::InferenceError;

/// An [`InferenceError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub InferenceError);

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::warn!("{}", self.0);
        } else {
            tracing::debug!("{}", self.0);
        }
        (status, Json(self.0.body())).into_response()
    }
}
