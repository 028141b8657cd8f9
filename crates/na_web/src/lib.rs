use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::{AppState, DEFAULT_UPLOAD_LIMIT};

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let body_limit = DefaultBodyLimit::max(state.upload_limit);

    Router::new()
        .route("/summarize/", post(handlers::summarize))
        .layer(body_limit)
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the app until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> na_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
