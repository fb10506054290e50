use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::QueryError;

/// The only failures a client ever sees. Each endpoint folds its internal errors into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,
    #[error("resource not found")]
    NotFound,
    #[error("unprocessable")]
    Unprocessable,
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Collapses a failure into a fixed [`ApiError`], logging what actually went wrong.
pub trait OrApiError<T> {
    fn or_api_error(self, kind: ApiError) -> Result<T, ApiError>;
}

impl<T> OrApiError<T> for Result<T, QueryError> {
    fn or_api_error(self, kind: ApiError) -> Result<T, ApiError> {
        self.map_err(|e| {
            match &e {
                QueryError::NotFound { .. } => tracing::debug!(error = %e, ?kind, "lookup missed"),
                QueryError::Database(_) => tracing::warn!(error = %e, ?kind, "query failed"),
            }
            kind
        })
    }
}

/// Same as [`OrApiError`] for request rejections, which are always the client's doing.
pub fn rejected<R: Display>(kind: ApiError) -> impl FnOnce(R) -> ApiError {
    move |rejection: R| {
        tracing::debug!(%rejection, ?kind, "request rejected");
        kind
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
