//! HTTP server hosting the health endpoints

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::core::{Error, Result};
use crate::health::HealthService;

/// Creates the application router with all routes and middleware
pub fn create_app(health: Arc<HealthService>, metrics_enabled: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness));

    if metrics_enabled {
        router = router.route("/metrics", get(handlers::metrics_handler));
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(health)
}

/// Serve `app` on `addr` until `shutdown` resolves
pub async fn start_server<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Cannot bind {}: {}", addr, e);
        Error::Io(e)
    })?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health report available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::server(format!("HTTP server failed: {}", e)))?;

    Ok(())
}
