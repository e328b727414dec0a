//! `uzhavar serve` -- HTTP JSON API for farmers.
//!
//! Endpoints:
//! - GET  /health      - Server status and whether a model key is configured
//! - GET  /api/prices  - Market prices (model or fallback, see `x-data-source`)
//! - GET  /api/news    - Agricultural news (model or fallback)
//! - POST /api/scan    - Crop photo analysis, body `{"image": "<base64>"}`
//!
//! All responses use Content-Type: application/json. Errors carry a
//! `{"message": ...}` body.

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use self::handlers::{
    handle_health, handle_news, handle_not_found, handle_panic, handle_prices, handle_scan,
};
use self::state::AppState;
use crate::config::ServeConfig;
use crate::orchestrator::DataOrchestrator;

/// Maximum request body size: 10 MB. Photos arrive base64-encoded.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Response header naming the origin of a collection: `model` or `fallback`.
pub(crate) const DATA_SOURCE_HEADER: &str = "x-data-source";

pub(crate) const MISSING_IMAGE: &str = "Image data is required";

/// How long in-flight HTTPS connections get to finish after Ctrl+C.
#[cfg(feature = "tls")]
const GRACEFUL_SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"message": message})))
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([axum::http::HeaderName::from_static(DATA_SOURCE_HEADER)]);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/prices", get(handle_prices))
        .route("/api/news", get(handle_news))
        .route("/api/scan", post(handle_scan))
        .fallback(handle_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C.
///
/// When TLS cert/key paths are provided (and the `tls` feature is on), the
/// server listens over HTTPS using `axum-server` with rustls.
pub(crate) async fn start_server(
    config: ServeConfig,
    orchestrator: DataOrchestrator,
) -> anyhow::Result<()> {
    let model_configured = orchestrator.gateway().is_configured();
    if model_configured {
        info!(
            timeout_secs = orchestrator.gateway().timeout().as_secs(),
            "model gateway enabled"
        );
    } else {
        info!("no model API key configured, serving fallback data only");
    }

    let app = build_router(Arc::new(AppState::new(orchestrator)));

    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&config.tls_cert, &config.tls_key) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("failed to load TLS certificate or key")?;
        let addr = tokio::net::lookup_host((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("cannot resolve {}", config.host))?
            .next()
            .with_context(|| format!("no address for {}", config.host))?;
        info!(%addr, "uzhavar listening on https");
        let handle: axum_server::Handle = axum_server::Handle::new();
        spawn_graceful_shutdown(handle.clone(), shutdown_signal());
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("server error")?;
        info!("server shut down");
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    if config.tls_cert.is_some() || config.tls_key.is_some() {
        tracing::warn!("TLS options ignored: built without the `tls` feature");
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "uzhavar listening on http");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}

/// Drain open connections once `signal` resolves.
#[cfg(feature = "tls")]
fn spawn_graceful_shutdown<F>(handle: axum_server::Handle, signal: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
    });
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
