//! API error type.
//!
//! Every failure is answered with a `StateResponse`. Decode, validation and
//! authorization failures all read `"failed"` so the caller never learns
//! which field was wrong.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::DomainError;

use crate::extract::Protobuf;
use crate::wire::StateResponse;

pub const FAILED: &str = "failed";
pub const IMAGE_NOT_FOUND: &str = "Image not found.";
const INTERNAL: &str = "internal error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("malformed request body")]
    Decode,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Image backend failure; the message goes back to the caller as is.
    #[error("{0}")]
    Storage(String),

    /// Event backend failure; the caller only sees a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Mapping for image operations, where backend detail is reported.
    pub fn storage(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            other => Self::Storage(other.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Decode | Self::PayloadTooLarge | Self::Unauthorized | Self::BadRequest(_) => FAILED.to_string(),
            Self::NotFound(_) => IMAGE_NOT_FOUND.to_string(),
            Self::Storage(msg) => msg.clone(),
            Self::Internal(_) => INTERNAL.to_string(),
        }
    }
}

/// Mapping for event operations.
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Storage(_) | Self::Internal(_) => tracing::error!(error = %self, "request failed"),
            Self::BadRequest(_) => tracing::debug!(error = %self, "request rejected"),
            _ => {}
        }
        (status, Protobuf(StateResponse::new(self.public_message()))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_backend_detail_is_hidden() {
        let err = ApiError::from(DomainError::Backend("disk I/O error at /var/db".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal error");
    }

    #[test]
    fn image_backend_detail_is_reported() {
        let err = ApiError::storage(DomainError::NotFound("image abc.png".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "image abc.png not found");
    }

    #[test]
    fn client_errors_are_opaque() {
        for err in [
            ApiError::Decode,
            ApiError::Unauthorized,
            ApiError::BadRequest("malformed event uuid".into()),
        ] {
            assert_eq!(err.public_message(), FAILED);
        }
        assert_eq!(ApiError::storage(DomainError::Validation("x".into())).status_code(), StatusCode::BAD_REQUEST);
    }
}
