//! HTTP surface of the explorer backend.

pub mod http;

use crate::engine::MutationEngine;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const DEFAULT_BASE_PATH: &str = "/file-explorer";

/// Shared application state
pub struct AppState {
    pub engine: Arc<MutationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<MutationEngine>) -> Self {
        Self { engine }
    }
}

/// `"/file-explorer/"` and `"file-explorer"` both become `"/file-explorer"`;
/// an empty or `"/"` prefix mounts at the root.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Create the API router under `base_path`
pub fn create_router(state: Arc<AppState>, base_path: &str) -> Router {
    let base = normalize_base_path(base_path);
    let collection = if base.is_empty() { "/".to_string() } else { base.clone() };

    Router::new()
        .route(&collection, get(http::get_forest))
        .route(&format!("{}/create", base), post(http::create_root))
        .route(&format!("{}/insert", base), post(http::insert_child))
        .route(
            &format!("{}/{{id}}", base),
            get(http::get_subtree)
                .put(http::edit_node)
                .delete(http::delete_node),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    base_path: &str,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, base_path);
    info!(
        addr = %listener.local_addr()?,
        base_path = %normalize_base_path(base_path),
        "Explorer server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: Arc<AppState>, base_path: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state, base_path, shutdown_signal()).await?;
    info!("Explorer server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}
