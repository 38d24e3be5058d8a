use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Failure of a single request; the server keeps serving afterwards.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] calendar_store::Error),

    /// Body was not valid JSON for the expected shape.
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("no such resource")]
    NoRoute,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
            // Reading the body failed (e.g. over the size limit).
            ApiError::Body(rejection @ JsonRejection::BytesRejection(_)) => rejection.status(),
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRoute => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();
        debug!(%status, %error, "request failed");

        (status, Json(ErrorBody { error })).into_response()
    }
}
