use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::bootstrap::app_context::AppContext;

/// Absolute origin used when building links handed to the document server.
///
/// Resolution order: `PUBLIC_BASE_URL`, then `X-Forwarded-Proto`/`X-Forwarded-Host`,
/// then plain `http` with the `Host` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

fn first_forwarded(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn resolve_base_url(public_base_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    let proto = first_forwarded(headers, "x-forwarded-proto").unwrap_or_else(|| "http".into());
    let host = first_forwarded(headers, "x-forwarded-host")
        .or_else(|| first_forwarded(headers, "host"))
        .unwrap_or_else(|| "localhost".into());
    format!("{proto}://{host}")
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for BaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(BaseUrl(resolve_base_url(
            ctx.cfg.public_base_url.as_deref(),
            &parts.headers,
        )))
    }
}
