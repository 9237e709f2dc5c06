//! Route table and middleware chain.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /health` | [`health::health`] |
//! | `GET /cves/{family}/{release}/{id}` | [`lookup::get_by_cve_id`] |
//! | `GET /packs/{family}/{release}/{pack}` | [`lookup::get_by_pack_name`] |
//!
//! Anything else, including a known path with another method (`HEAD` too),
//! is `404`.
//!
//! # Middleware (outermost first)
//!
//! 1. access log ([`access_log::record`])
//! 2. request metrics ([`track_requests`])
//! 3. panic recovery (`CatchPanicLayer`, `500`)

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::handler::Handler;
use axum::routing::{MethodRouter, get};
use tower_http::catch_panic::CatchPanicLayer;

use ovaldict_core::metrics::{
    HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL, LABEL_ROUTE, LABEL_STATUS,
};

use crate::access_log::{self, AccessLog};
use crate::health;
use crate::lookup::{self, AppState};

/// Build the application router.
pub fn build_router(state: AppState, access_log: Arc<AccessLog>) -> Router {
    Router::new()
        .route("/health", get_only(health::health))
        .route("/cves/{family}/{release}/{id}", get_only(lookup::get_by_cve_id))
        .route("/packs/{family}/{release}/{pack}", get_only(lookup::get_by_pack_name))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(track_requests))
        .layer(middleware::from_fn_with_state(access_log, access_log::record))
}

/// `GET` without the implicit `HEAD` axum adds to every `get` route.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).head(not_found)
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "Not Found" })),
    )
        .into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked, request recovered");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "message": "Internal Server Error" })),
    )
        .into_response()
}

/// Count requests and record latency per matched route.
async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "not_found".to_owned());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(HTTP_REQUESTS_TOTAL, LABEL_ROUTE => route.clone(), LABEL_STATUS => status)
        .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, LABEL_ROUTE => route)
        .record(start.elapsed().as_secs_f64());

    response
}
