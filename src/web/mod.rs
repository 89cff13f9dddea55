//! Web layer module
//!
//! Thin axum handlers over [`DatasetService`]. Routes are registered both
//! with and without a trailing slash so either client convention works.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, services::DatasetService};

pub mod api;
pub mod responses;

pub use responses::{handle_error, ErrorResponse};

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, service: DatasetService) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = Self::router(AppState { service, config });

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn router(state: AppState) -> Router {
        let body_limit = state.config.web.max_upload_bytes;

        Router::new()
            .route("/health", get(api::health_check))
            .route("/api/upload", post(api::upload_dataset))
            .route("/api/upload/", post(api::upload_dataset))
            .route("/api/datasets", get(api::list_datasets))
            .route("/api/datasets/", get(api::list_datasets))
            .route("/api/datasets/:id", get(api::get_dataset))
            .route("/api/datasets/:id/", get(api::get_dataset))
            .route("/api/datasets/:id/pdf", get(api::get_dataset_report))
            .route("/api/datasets/:id/pdf/", get(api::get_dataset_report))
            // Middleware (applied in reverse order)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: DatasetService,
    pub config: Config,
}
