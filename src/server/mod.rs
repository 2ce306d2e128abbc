//! HTTP surface: an axum router over the two library entry points.
//!
//! | Method | Path                | Handler                         |
//! |--------|---------------------|---------------------------------|
//! | POST   | `/api/parse`        | [`handlers::parse`]             |
//! | POST   | `/api/generate-pdf` | [`handlers::generate_pdf`]      |
//! | GET    | `/health`           | [`handlers::health`]            |
//!
//! Every error is answered as `{"error": "..."}` with the status from
//! [`InvoiceError::status`]. CORS is open to all origins.

pub mod handlers;

use crate::config::ServiceConfig;
use crate::error::InvoiceError;
use crate::pipeline::generate::TextGenerator;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state accessible from all handlers.
///
/// Built once at startup; never mutated afterwards.
pub struct AppState {
    pub config: ServiceConfig,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(config: ServiceConfig, generator: Arc<dyn TextGenerator>) -> Arc<Self> {
        Arc::new(Self { config, generator })
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/parse", post(handlers::parse))
        .route("/api/generate-pdf", post(handlers::generate_pdf))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION])
}

/// Serve `router(state)` on `listener` until Ctrl-C / SIGTERM.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), InvoiceError> {
    let addr = listener
        .local_addr()
        .map_err(|e| InvoiceError::Internal(format!("listener address: {e}")))?;
    info!("Backend running on http://{addr}");
    info!("Available endpoints:");
    info!("  - POST /api/parse (AI parsing)");
    info!("  - POST /api/generate-pdf (PDF generation)");
    info!("  - GET /health (health check)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| InvoiceError::Internal(format!("server error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Could not install SIGTERM handler: {e}");
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
    info!("Shutting down");
}

impl IntoResponse for InvoiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("{message}");
        } else {
            warn!("Rejected request: {message}");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
