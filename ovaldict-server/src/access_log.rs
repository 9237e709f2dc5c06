//! Access log sink and middleware.
//!
//! [`AccessLog`] owns the `access.log` file for the lifetime of the server.
//! It is opened once by the start routine and handed to the router as
//! middleware state; there is no global handle.
//!
//! # Format
//!
//! One JSON object per line:
//!
//! ```text
//! {"time":"2026-10-18T09:00:00.000000Z","id":"…","remote_ip":"127.0.0.1","method":"GET",
//!  "uri":"/cves/ubuntu/16/CVE-2020-1234","status":200,"latency":183000,"latency_human":"183µs"}
//! ```
//!
//! Each line is written with a single `write_all` under a mutex and flushed
//! immediately, so concurrent requests never interleave within a line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use ovaldict_core::error::StartupError;

/// Access log file name inside the configured log directory.
pub const ACCESS_LOG_FILE: &str = "access.log";

/// One access log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Completion time (RFC 3339, UTC).
    pub time: String,
    /// Per-request identifier.
    pub id: String,
    /// Peer address, when the server was started with connect info.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    pub method: String,
    pub uri: String,
    pub status: u16,
    /// Latency in nanoseconds.
    pub latency: u64,
    pub latency_human: String,
}

impl AccessRecord {
    fn new(
        method: String,
        uri: String,
        remote_ip: Option<String>,
        status: u16,
        latency: Duration,
    ) -> Self {
        Self {
            time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            id: uuid::Uuid::new_v4().to_string(),
            remote_ip,
            method,
            uri,
            status,
            latency: u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX),
            latency_human: format!("{latency:?}"),
        }
    }
}

/// Append-only access log file with serialized writes.
#[derive(Debug)]
pub struct AccessLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AccessLog {
    /// Create (if absent) and open `{log_dir}/access.log` in append mode.
    ///
    /// The directory must already exist. On unix the file is created with
    /// mode `0600`.
    pub fn open(log_dir: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = log_dir.as_ref().join(ACCESS_LOG_FILE);

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options
            .open(&path)
            .map_err(|source| StartupError::AccessLog {
                path: path.display().to_string(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "access log opened");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line and flush.
    ///
    /// Failures are reported through `tracing` and never reach the caller.
    pub fn write(&self, record: &AccessRecord) {
        let mut line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize access log record");
                return;
            }
        };
        line.push('\n');

        // Poisoning leaves the file handle intact.
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = file.write_all(line.as_bytes()).and_then(|()| file.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write access log");
        }
    }
}

/// Middleware recording method, path, status and latency of every request.
pub async fn record(State(log): State<Arc<AccessLog>>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let remote_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let response = next.run(request).await;

    let record = AccessRecord::new(
        method,
        uri,
        remote_ip,
        response.status().as_u16(),
        start.elapsed(),
    );
    log.write(&record);

    response
}
