//! Definition lookup handlers.
//!
//! Request flow for both lookup routes:
//!
//! ```text
//! path params --> LookupKey --> DefinitionStore (blocking pool) --> translate --> response
//! ```
//!
//! Store failures are translated according to [`StoreErrorPolicy`]; by
//! default they are logged at info level and answered with `200 []`.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde::Deserialize;

use ovaldict_core::config::StoreErrorPolicy;
use ovaldict_core::error::StoreError;
use ovaldict_core::metrics::{LABEL_RESULT, LABEL_SELECTOR, LOOKUPS_TOTAL};
use ovaldict_core::store::DefinitionStore;
use ovaldict_core::types::{Definition, LookupKey, Selector};

/// Shared, read-only state of the lookup handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DefinitionStore>,
    pub error_policy: StoreErrorPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn DefinitionStore>, error_policy: StoreErrorPolicy) -> Self {
        Self {
            store,
            error_policy,
        }
    }
}

/// Path parameters of `/cves/{family}/{release}/{id}`.
#[derive(Debug, Deserialize)]
pub struct CvePath {
    pub family: String,
    pub release: String,
    pub id: String,
}

impl From<CvePath> for LookupKey {
    fn from(path: CvePath) -> Self {
        LookupKey::by_cve_id(path.family, path.release, path.id)
    }
}

/// Path parameters of `/packs/{family}/{release}/{pack}`.
#[derive(Debug, Deserialize)]
pub struct PackPath {
    pub family: String,
    pub release: String,
    pub pack: String,
}

impl From<PackPath> for LookupKey {
    fn from(path: PackPath) -> Self {
        LookupKey::by_package_name(path.family, path.release, path.pack)
    }
}

/// `GET /cves/{family}/{release}/{id}`
pub async fn get_by_cve_id(
    State(state): State<AppState>,
    path: Result<Path<CvePath>, PathRejection>,
    uri: Uri,
) -> Response {
    let path = match path {
        Ok(Path(path)) => path,
        Err(rejection) => {
            tracing::debug!(%rejection, "decoding path params lossily");
            let [family, release, id] = lossy_params(&uri);
            CvePath {
                family,
                release,
                id,
            }
        }
    };
    tracing::info!(
        family = %path.family,
        release = %path.release,
        cve_id = %path.id,
        "lookup by cve id"
    );
    lookup(state, path.into()).await
}

/// `GET /packs/{family}/{release}/{pack}`
pub async fn get_by_pack_name(
    State(state): State<AppState>,
    path: Result<Path<PackPath>, PathRejection>,
    uri: Uri,
) -> Response {
    let path = match path {
        Ok(Path(path)) => path,
        Err(rejection) => {
            tracing::debug!(%rejection, "decoding path params lossily");
            let [family, release, pack] = lossy_params(&uri);
            PackPath {
                family,
                release,
                pack,
            }
        }
    };
    tracing::info!(
        family = %path.family,
        release = %path.release,
        pack = %path.pack,
        "lookup by package name"
    );
    lookup(state, path.into()).await
}

/// The three parameters of `/{prefix}/{family}/{release}/{value}`, percent-decoded
/// with invalid UTF-8 replaced by U+FFFD.
fn lossy_params(uri: &Uri) -> [String; 3] {
    let mut segments = uri
        .path()
        .split('/')
        .skip(2)
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned());
    std::array::from_fn(|_| segments.next().unwrap_or_default())
}

async fn lookup(state: AppState, key: LookupKey) -> Response {
    let result = query(Arc::clone(&state.store), key.clone()).await;
    translate(&key, result, state.error_policy)
}

/// Run the synchronous store call on the blocking pool.
///
/// A panic inside the store is re-raised on the handler task so the
/// router's recovery layer answers it like any other handler fault.
async fn query(
    store: Arc<dyn DefinitionStore>,
    key: LookupKey,
) -> Result<Vec<Definition>, StoreError> {
    match tokio::task::spawn_blocking(move || store.lookup(&key)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(StoreError::Unavailable(format!("lookup task cancelled: {e}"))),
    }
}

/// Translate a store result into the wire response.
///
/// - `Ok` (including empty): `200` with the definitions as a JSON array, store order.
/// - `Err` under [`StoreErrorPolicy::Swallow`]: logged, `200 []`.
/// - `Err` under [`StoreErrorPolicy::BadGateway`]: logged, `502 {"error": ...}`.
pub fn translate(
    key: &LookupKey,
    result: Result<Vec<Definition>, StoreError>,
    policy: StoreErrorPolicy,
) -> Response {
    let selector = key.selector.kind();

    match result {
        Ok(definitions) => {
            let outcome = if definitions.is_empty() { "miss" } else { "hit" };
            metrics::counter!(LOOKUPS_TOTAL, LABEL_SELECTOR => selector, LABEL_RESULT => outcome)
                .increment(1);
            (StatusCode::OK, Json(definitions)).into_response()
        }
        Err(err) => {
            metrics::counter!(LOOKUPS_TOTAL, LABEL_SELECTOR => selector, LABEL_RESULT => "error")
                .increment(1);
            match &key.selector {
                Selector::ByCveId(_) => tracing::info!(
                    error = %err,
                    family = %key.family,
                    release = %key.release,
                    "failed to get by cve id"
                ),
                Selector::ByPackageName(_) => tracing::info!(
                    error = %err,
                    family = %key.family,
                    release = %key.release,
                    "failed to get by package name"
                ),
            }

            match policy {
                StoreErrorPolicy::Swallow => {
                    (StatusCode::OK, Json(Vec::<Definition>::new())).into_response()
                }
                StoreErrorPolicy::BadGateway => (
                    StatusCode::BAD_GATEWAY,
                    Json(serde_json::json!({ "error": err.to_string() })),
                )
                    .into_response(),
            }
        }
    }
}
