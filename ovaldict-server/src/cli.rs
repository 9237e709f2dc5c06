//! CLI argument definitions for ovaldict-server.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use ovaldict_core::config::OvalDictConfig;
use ovaldict_core::error::OvalDictError;

/// Read-only HTTP lookup service for OVAL vulnerability definitions.
#[derive(Parser, Debug)]
#[command(name = "ovaldict-server")]
#[command(version, about, long_about = None)]
pub struct ServerCli {
    /// Path to ovaldict.toml configuration file.
    ///
    /// Built-in defaults (plus environment overrides) are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override bind address.
    #[arg(long)]
    pub bind: Option<String>,

    /// Override listen port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override access log directory.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Override definition database directory.
    #[arg(long)]
    pub db_path: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

impl ServerCli {
    /// Resolve the effective configuration.
    ///
    /// Order: file (or built-in defaults), environment, command-line flags.
    /// Validation runs once, on the merged result.
    pub async fn resolve_config(&self) -> Result<OvalDictConfig, OvalDictError> {
        let mut config = match &self.config {
            Some(path) => OvalDictConfig::from_file(path).await?,
            None => OvalDictConfig::default(),
        };
        config.apply_env_overrides();
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut OvalDictConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(log_dir) = &self.log_dir {
            config.general.log_dir = log_dir.clone();
        }
        if let Some(db_path) = &self.db_path {
            config.store.db_path = db_path.clone();
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_without_arguments() {
        let cli = ServerCli::try_parse_from(["ovaldict-server"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.validate);
    }

    #[test]
    fn overrides_take_precedence() {
        let cli = ServerCli::try_parse_from([
            "ovaldict-server",
            "--bind",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-dir",
            "/tmp/ovaldict",
            "--db-path",
            "/srv/oval",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = OvalDictConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.server.bind_url(), "0.0.0.0:8080");
        assert_eq!(config.general.log_dir, "/tmp/ovaldict");
        assert_eq!(config.store.db_path, "/srv/oval");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "json");
    }

    #[tokio::test]
    async fn flag_corrects_invalid_file_value() {
        // Given: A config file with an invalid log level
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovaldict.toml");
        std::fs::write(&path, "[general]\nlog_level = \"loud\"\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        // When: The flag overrides it
        let cli = ServerCli::try_parse_from([
            "ovaldict-server",
            "--config",
            path.as_str(),
            "--log-level",
            "warn",
        ])
        .unwrap();
        let config = cli.resolve_config().await.unwrap();

        // Then: Validation sees the merged value
        assert_eq!(config.general.log_level, "warn");
    }

    #[tokio::test]
    async fn invalid_file_value_without_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovaldict.toml");
        std::fs::write(&path, "[general]\nlog_level = \"loud\"\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let cli = ServerCli::try_parse_from(["ovaldict-server", "--config", path.as_str()]).unwrap();
        let result = cli.resolve_config().await;

        assert!(matches!(result, Err(OvalDictError::Config(_))));
    }

    #[tokio::test]
    async fn missing_config_file_is_reported() {
        let cli =
            ServerCli::try_parse_from(["ovaldict-server", "--config", "/nonexistent/ovaldict.toml"])
                .unwrap();
        let result = cli.resolve_config().await;
        assert!(matches!(result, Err(OvalDictError::Config(_))));
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(ServerCli::try_parse_from(["ovaldict-server", "--port", "http"]).is_err());
    }
}
