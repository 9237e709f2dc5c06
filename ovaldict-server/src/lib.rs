//! ovaldict server library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `ovaldict-server` is used as a binary (main.rs).

pub mod access_log;
pub mod cli;
pub mod health;
pub mod logging;
pub mod lookup;
pub mod metrics_server;
pub mod router;
pub mod server;

pub use lookup::AppState;
pub use router::build_router;
pub use server::{Server, start};
