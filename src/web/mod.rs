use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{config::WebConfig, services::AnalysisService};

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::{handle_error, ErrorResponse};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub analysis: AnalysisService,
    pub max_upload_size: usize,
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, analysis: AnalysisService) -> Result<Self> {
        let app = create_router(AppState {
            analysis,
            max_upload_size: config.max_upload_size,
        });
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

        Ok(Self { app, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until SIGINT or SIGTERM, then finish in-flight requests
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Web server stopped");
        Ok(())
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let max_upload_size = state.max_upload_size;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/analyze", post(handlers::analyze::analyze_image))
        .route(
            "/api/history",
            get(handlers::history::list_history).delete(handlers::history::clear_history),
        )
        .route(
            "/api/history/{hash}",
            get(handlers::history::get_history_entry),
        )
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(axum::middleware::from_fn(
            middleware::request_tracing_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
                }
            }
            _ => {
                warn!("Failed to install unix signal handlers, falling back to Ctrl+C");
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received Ctrl+C, shutting down gracefully");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    }
}
