use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::bootstrap::app_context::AppContext;

#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResp {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EditorStatusResp {
    /// A document server URL is configured.
    pub configured: bool,
    /// The document server answered its healthcheck.
    pub reachable: bool,
}

#[utoipa::path(get, path = "/healthz", tag = "Health", responses((status = 200, body = LivenessResp)))]
pub async fn healthz() -> Json<LivenessResp> {
    Json(LivenessResp { ok: true })
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResp> {
    let storage_ok = match ctx.document_store().check_writable().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = ?e, "storage_not_writable");
            false
        }
    };
    let status = if storage_ok { "ok" } else { "degraded" };
    Json(HealthResp { status })
}

#[utoipa::path(
    get,
    path = "/api/editor/status",
    tag = "Health",
    responses((status = 200, body = EditorStatusResp))
)]
pub async fn editor_status(State(ctx): State<AppContext>) -> Json<EditorStatusResp> {
    let Some(server_url) = ctx.cfg.document_server_url.as_deref() else {
        return Json(EditorStatusResp {
            configured: false,
            reachable: false,
        });
    };
    let reachable = ctx
        .editor_probe()
        .healthcheck(server_url)
        .await
        .unwrap_or_else(|e| {
            tracing::debug!(error = ?e, server_url, "editor_healthcheck_failed");
            false
        });
    Json(EditorStatusResp {
        configured: true,
        reachable,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/editor/status", get(editor_status))
        .with_state(ctx)
}
