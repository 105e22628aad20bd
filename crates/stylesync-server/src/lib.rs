//! ============================================================================
//! STYLESYNC-SERVER: Storefront REST Backend
//! ============================================================================
//! Minimal HTTP surface around the catalog and a persistent user store:
//! - GET  /                         health message
//! - POST /api/user/register        create a user account
//! - GET  /api/products             full catalog
//! - GET  /api/products/:category   one category slice
//! ============================================================================

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    health_handler, list_products_handler, products_by_category_handler, register_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(health_handler))
        .route("/api/user/register", post(register_handler))
        .route("/api/products", get(list_products_handler))
        .route("/api/products/:category", get(products_by_category_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::new()?;

    let port = state.config.port;
    let app = router(state);

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
