use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Generic message for role or ownership violations.
pub const FORBIDDEN: &str = "forbidden access";
/// Message for requesters that are blocked or unknown.
pub const BLOCKED: &str = "Access denied. You are blocked.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No session credential was presented.
    #[error("unauthorized access")]
    Unauthenticated,

    /// A credential was presented but failed signature or expiry checks.
    #[error("unauthorized access")]
    InvalidCredential,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// Store or runtime failure. Only `context` reaches the client.
    #[error("{context}")]
    Internal {
        context: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { context, cause } => error!("{}: {:#}", context, cause),
            other => debug!("Request rejected: {}", other),
        }

        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Attach a client-facing context message to a store failure.
pub trait ResultExt<T> {
    fn or_internal(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for anyhow::Result<T> {
    fn or_internal(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|cause| ApiError::Internal { context, cause })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(BLOCKED).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::invalid("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("Not found").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let err: Result<(), ApiError> =
            Err(anyhow::anyhow!("disk I/O error at page 42")).or_internal("Update failed");
        let err = err.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Update failed");
    }
}
