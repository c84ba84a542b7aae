//! HTTP front end.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | liveness probe, never touches the extractor |
//! | `POST /extract` | multipart upload, field `image` → coordinates or rejection |

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};

use crate::config::ServiceConfig;
use crate::exif::ReferencePolicy;

mod error;
pub mod extract_api;

pub use error::{HttpError, HttpResult};
pub use extract_api::ExtractResponse;

pub const STATUS_MESSAGE: &str = "GPS extraction service is running.";

#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub reference_policy: ReferencePolicy,
}

#[derive(Serialize)]
struct Status {
    status: &'static str,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(|| async { Json(Status { status: STATUS_MESSAGE }) }))
        .route("/extract", post(extract_api::extract))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Bind the configured address and serve until Ctrl+C / SIGTERM.
pub async fn serve(config: &ServiceConfig) -> std::io::Result<()> {
    let state = AppState {
        reference_policy: config.gps.reference_policy,
    };
    let app = router(state, config.server.max_upload_bytes);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}")
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
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
