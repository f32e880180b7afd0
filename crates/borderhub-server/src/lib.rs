//! borderhub-server: Axum web server with the exploration API and the
//! embedded dashboard page.

pub mod api;
pub mod session;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::state::AppState;

pub use state::ServerConfig;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pictures = ServeDir::new(state.pictures_dir.as_ref());

    Router::new()
        // API routes
        .nest("/api", api::router())
        // Slide images
        .nest_service("/pictures", pictures)
        // Frontend: serve embedded static files
        .fallback(api::serve_frontend)
        .with_state(state)
        .layer(cors)
}

/// Start the server on the given address.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(&config);

    // Warm the cache; a failure here only disables the explorer views.
    match state.cache.get() {
        Ok(data) => info!(
            borders = data.borders.len(),
            conflict_rows = data.conflicts.len(),
            "result files cached"
        ),
        Err(e) => warn!("exploration data unavailable: {}", e),
    }

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Borderland dashboard at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
