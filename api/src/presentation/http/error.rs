use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::documents::error::DocumentError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Error surfaced to browser-facing routes as `{error: "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            DocumentError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not found"),
            DocumentError::TokenInvalid(_) | DocumentError::TokenMissing => {
                Self::new(StatusCode::FORBIDDEN, err.to_string())
            }
            DocumentError::UpstreamFetch(ref e) => {
                tracing::error!(error = ?e, "upstream_fetch_failed");
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
            DocumentError::Signing(ref e) => {
                tracing::error!(error = ?e, "signing_failed");
                Self::internal()
            }
            DocumentError::Storage(ref e) => {
                tracing::error!(error = ?e, "storage_failed");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (DocumentError::validation("Missing required fields"), StatusCode::BAD_REQUEST),
            (DocumentError::NotFound, StatusCode::NOT_FOUND),
            (DocumentError::TokenMissing, StatusCode::FORBIDDEN),
            (
                DocumentError::Storage(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let err = ApiError::from(DocumentError::Storage(anyhow::anyhow!("/secret/path")));
        assert_eq!(err.message, "internal error");
    }
}
