//! Liveness reporting.
//!
//! `GET /health` answers `200` with an empty body. It never touches the
//! definition store, so it stays healthy while the store is failing.

use axum::http::StatusCode;

/// `GET /health`
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "")
}
