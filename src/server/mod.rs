pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::App;
use crate::error::Result;

pub use errors::ApiError;

/// Creates the router with every route bound to the shared `App`.
pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/arxiv/", get(handlers::search_arxiv))
        .route(
            "/queries/",
            get(handlers::queries_report).post(handlers::queries_json),
        )
        .route("/results/", get(handlers::results))
        .with_state(app)
        .layer(TraceLayer::new_for_http())
}

/// Serves on an already bound listener until Ctrl-C.
pub async fn run(listener: TcpListener, app: App) -> Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
