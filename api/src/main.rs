use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use docdesk::application::services::editor_token::EditorTokenSigner;
use docdesk::bootstrap::app_context::{AppContext, AppServices};
use docdesk::bootstrap::config::Config;
use docdesk::infrastructure::editor::blob_fetcher_reqwest::ReqwestBlobFetcher;
use docdesk::infrastructure::editor::probe_reqwest::ReqwestEditorProbe;
use docdesk::infrastructure::storage::FsDocumentStore;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            docdesk::presentation::http::documents::upload_document,
            docdesk::presentation::http::documents::list_documents,
            docdesk::presentation::http::documents::get_document,
            docdesk::presentation::http::documents::download_document,
            docdesk::presentation::http::documents::editor_config,
            docdesk::presentation::http::callback::editor_callback,
            docdesk::presentation::http::health::healthz,
            docdesk::presentation::http::health::health,
            docdesk::presentation::http::health::editor_status,
        ),
        components(schemas(
            docdesk::presentation::http::documents::UploadRequest,
            docdesk::presentation::http::documents::UploadResponse,
            docdesk::presentation::http::documents::Document,
            docdesk::presentation::http::documents::DocumentListResponse,
            docdesk::presentation::http::documents::DocumentBinary,
            docdesk::presentation::http::documents::EditorConfigResponse,
            docdesk::presentation::http::callback::CallbackRequest,
            docdesk::presentation::http::callback::CallbackAck,
            docdesk::presentation::http::error::ErrorBody,
            docdesk::presentation::http::health::LivenessResp,
            docdesk::presentation::http::health::HealthResp,
            docdesk::presentation::http::health::EditorStatusResp,
        )),
        tags(
            (name = "Documents", description = "Document storage"),
            (name = "Editor", description = "Document server integration"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // Unparseable FRONTEND_URL or none at all: deny cross-origin in production
        _ if cfg.is_production => base.allow_origin(AllowOrigin::exact(HeaderValue::from_static(
            "http://invalid",
        ))),
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "ctrl_c_handler_failed");
    }
    info!("shutdown_requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "docdesk=debug,tower_http=info,axum=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        storage_dir = %cfg.storage_dir,
        public_base_url = ?cfg.public_base_url,
        document_server_url = ?cfg.document_server_url,
        callback_require_token = cfg.callback_require_token,
        production = cfg.is_production,
        "Starting docdesk backend"
    );

    let store = FsDocumentStore::new(&cfg.storage_dir);
    store.ensure_root().await?;
    let fetcher = ReqwestBlobFetcher::new(
        cfg.callback_fetch_timeout_secs
            .map(std::time::Duration::from_secs),
    )?;
    let probe = ReqwestEditorProbe::new()?;
    let signer = EditorTokenSigner::new(&cfg.jwt_secret, cfg.editor_token_ttl_secs);

    let services = AppServices::new(
        Arc::new(store),
        Arc::new(fetcher),
        Arc::new(probe),
        signer,
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let mut app = docdesk::presentation::http::api_router(ctx)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));

    // Serve the built frontend with SPA fallback when present
    let dist = Path::new(&cfg.dist_dir);
    if dist.is_dir() {
        info!(dist_dir = %cfg.dist_dir, "serving_frontend");
        app = app.fallback_service(
            ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html"))),
        );
    }

    let app = app
        .layer(cors_layer(&cfg))
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
        .layer(CatchPanicLayer::new());

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    Ok(())
}
