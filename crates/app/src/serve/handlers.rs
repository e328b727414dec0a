//! HTTP route handlers: health, prices, news, scan.

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use uzhavar_domain::Sourced;

use super::state::AppState;
use super::{json_error, DATA_SOURCE_HEADER, MISSING_IMAGE};

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// Turns a handler panic into a generic 500; the detail stays in the log.
pub(crate) fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(detail, "handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_configured": state.model_configured(),
    });
    (StatusCode::OK, Json(response))
}

/// GET /api/prices
pub(crate) async fn handle_prices(State(state): State<Arc<AppState>>) -> Response {
    sourced_response(state.orchestrator.prices().await)
}

/// GET /api/news
pub(crate) async fn handle_news(State(state): State<Arc<AppState>>) -> Response {
    sourced_response(state.orchestrator.news().await)
}

/// POST /api/scan
///
/// Body: `{"image": "<base64 or data URI>"}`. Always 200 once an image is
/// present; analysis failures come back as the degraded outcome.
pub(crate) async fn handle_scan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return json_error(StatusCode::PAYLOAD_TOO_LARGE, "image too large").into_response();
        }
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected scan body");
            return json_error(StatusCode::BAD_REQUEST, MISSING_IMAGE).into_response();
        }
    };

    let image = match body.get("image").and_then(Value::as_str) {
        Some(image) if !image.trim().is_empty() => image,
        _ => return json_error(StatusCode::BAD_REQUEST, MISSING_IMAGE).into_response(),
    };

    let outcome = state.orchestrator.scan(image).await;
    (StatusCode::OK, Json(outcome)).into_response()
}

/// JSON body plus an `x-data-source` header naming where the data came from.
fn sourced_response<T: Serialize>(data: Sourced<T>) -> Response {
    let source = data.source().as_str();
    (
        StatusCode::OK,
        [(DATA_SOURCE_HEADER, source)],
        Json(data.into_inner()),
    )
        .into_response()
}
