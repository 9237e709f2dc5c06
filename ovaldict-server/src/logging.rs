//! Diagnostic log setup.
//!
//! ovaldict-server writes two streams:
//!
//! - the diagnostic log, installed here as the global `tracing` subscriber
//!   on stdout: startup, one info line per lookup with its path params,
//!   store failures, recovered panics;
//! - the access log, one JSON line per request in `{log_dir}/access.log`,
//!   owned by [`crate::access_log::AccessLog`] and independent of the level
//!   configured here.

use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ovaldict_core::config::GeneralConfig;

/// Install the diagnostic subscriber from `[general]`.
///
/// `RUST_LOG`, when set, replaces `log_level`. `log_format` is `json` (one
/// object per event, the default) or `pretty`. Call once, before serving.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        "pretty" => registry.with(fmt::layer().pretty()).try_init(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    installed.map_err(|e| {
        anyhow::anyhow!(
            "failed to install {} diagnostic subscriber: {e}",
            config.log_format
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_format() {
        let config = GeneralConfig {
            log_format: "xml".to_owned(),
            ..GeneralConfig::default()
        };
        let err = init_tracing(&config).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }
}
