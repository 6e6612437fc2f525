use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::documents::CallbackInput;
use crate::application::use_cases::documents::error::DocumentError;
use crate::application::use_cases::documents::handle_callback::HandleCallback;
use crate::bootstrap::app_context::AppContext;

/// Save notification posted by the document server.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackRequest {
    pub status: Option<i64>,
    /// Where the edited file can be fetched from.
    pub url: Option<String>,
    pub key: Option<String>,
    /// Signed body, when the server is configured to send the token inline.
    pub token: Option<String>,
}

/// `error` is 0 on success and 1 otherwise; the document server retries on 1.
#[derive(Debug, Serialize, ToSchema)]
pub struct CallbackAck {
    pub error: u8,
}

impl CallbackAck {
    fn ok() -> Json<Self> {
        Json(Self { error: 0 })
    }

    fn failed() -> Json<Self> {
        Json(Self { error: 1 })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[utoipa::path(post, path = "/api/documents/{id}/callback", tag = "Editor",
    params(("id" = String, Path, description = "Document ID")),
    request_body = CallbackRequest,
    responses(
        (status = 200, body = CallbackAck),
        (status = 403, body = CallbackAck, description = "Token missing or invalid")
    ))]
pub async fn editor_callback(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> (StatusCode, Json<CallbackAck>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(doc_id = %id, error = %rejection.body_text(), "callback_body_rejected");
            return (StatusCode::OK, CallbackAck::failed());
        }
    };

    let store = ctx.document_store();
    let fetcher = ctx.blob_fetcher();
    let uc = HandleCallback {
        store: store.as_ref(),
        fetcher: fetcher.as_ref(),
        signer: ctx.token_signer(),
        locks: ctx.locks(),
        require_token: ctx.cfg.callback_require_token,
    };
    let input = CallbackInput {
        status: req.status,
        url: req.url,
        key: req.key,
        token: req.token,
    };
    match uc.execute(&id, bearer_token(&headers), input).await {
        Ok(_) => (StatusCode::OK, CallbackAck::ok()),
        Err(DocumentError::TokenInvalid(_) | DocumentError::TokenMissing) => {
            (StatusCode::FORBIDDEN, CallbackAck::failed())
        }
        Err(err) => {
            tracing::warn!(doc_id = %id, error = ?err, "callback_failed");
            (StatusCode::OK, CallbackAck::failed())
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/documents/:id/callback", post(editor_callback))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
