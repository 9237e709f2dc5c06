//! Shared helpers for ovaldict-server integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use ovaldict_core::config::StoreErrorPolicy;
use ovaldict_core::error::StoreError;
use ovaldict_core::store::DefinitionStore;
use ovaldict_core::types::Definition;
use ovaldict_server::access_log::AccessLog;
use ovaldict_server::{AppState, build_router};

/// How [`StubStore`] answers every query.
pub enum Behavior {
    /// Return these definitions for any key.
    Records(Vec<Definition>),
    /// Return one definition whose ID encodes the query.
    Echo,
    /// Fail with this error.
    Fail(StoreError),
    /// Panic inside the store call.
    Panic,
}

/// In-memory store with scripted behavior and a call counter.
pub struct StubStore {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubStore {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(
        &self,
        kind: &str,
        family: &str,
        release: &str,
        value: &str,
    ) -> Result<Vec<Definition>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Records(defs) => Ok(defs.clone()),
            Behavior::Echo => Ok(vec![definition(&format!("{kind}:{family}:{release}:{value}"))]),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("store exploded"),
        }
    }
}

impl DefinitionStore for StubStore {
    fn get_by_cve_id(
        &self,
        family: &str,
        release: &str,
        cve_id: &str,
    ) -> Result<Vec<Definition>, StoreError> {
        self.answer("cve", family, release, cve_id)
    }

    fn get_by_pack_name(
        &self,
        family: &str,
        release: &str,
        pack: &str,
    ) -> Result<Vec<Definition>, StoreError> {
        self.answer("pack", family, release, pack)
    }
}

pub fn definition(id: &str) -> Definition {
    Definition {
        id: id.to_owned(),
        ..Definition::default()
    }
}

/// Router over `store` with its access log in a fresh temp dir.
pub fn app(store: Arc<dyn DefinitionStore>, policy: StoreErrorPolicy) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let access_log = Arc::new(AccessLog::open(dir.path()).expect("should open access log"));
    (build_router(AppState::new(store, policy), access_log), dir)
}

/// Send one request and collect status and body.
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("body should be utf-8"))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri).await
}

/// Tracing layer that records the level and message of every event.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedEvents {
    pub fn count(&self, level: Level, prefix: &str) -> usize {
        self.0
            .lock()
            .expect("capture lock")
            .iter()
            .filter(|(l, msg)| *l == level && msg.starts_with(prefix))
            .count()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0
            .lock()
            .expect("capture lock")
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
