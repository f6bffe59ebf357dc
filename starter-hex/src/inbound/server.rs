//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use starter_types::Repository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use crate::AppService;

/// HTTP Server for the starter API.
pub struct HttpServer<R: Repository> {
    state: Arc<AppState<R>>,
}

impl<R: Repository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: AppService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/api/user",
                get(handlers::get_user::<R>).patch(handlers::update_user::<R>),
            )
            .route(
                "/api/payment/create-order",
                post(handlers::create_order::<R>),
            )
            .route("/api/payment/verify", post(handlers::verify_payment::<R>))
            .route("/api/payment/webhook", post(handlers::payment_webhook::<R>))
            .route("/api/webhooks/clerk", post(handlers::identity_webhook::<R>))
            .route("/api/example-form", post(handlers::example_form::<R>))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
