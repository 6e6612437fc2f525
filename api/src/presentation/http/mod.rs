use axum::{Router, routing::get};

use crate::bootstrap::app_context::AppContext;

pub mod callback;
pub mod documents;
pub mod error;
pub mod health;
pub mod origin;

/// Every JSON route of the service, unlayered. Static files and docs are mounted by the binary.
pub fn api_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .nest("/api", health::routes(ctx.clone()))
        .nest("/api", documents::routes(ctx.clone()))
        .nest("/api", callback::routes(ctx))
}
