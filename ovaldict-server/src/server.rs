//! Server start routine.
//!
//! [`Server::bind`] acquires every startup resource (access log file,
//! TCP listener) and fails fast with a [`StartupError`] if either is
//! unavailable. [`Server::run_until`] then serves until the shutdown
//! future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use ovaldict_core::config::OvalDictConfig;
use ovaldict_core::error::{OvalDictError, StartupError};
use ovaldict_core::store::DefinitionStore;

use crate::access_log::AccessLog;
use crate::lookup::AppState;
use crate::router::build_router;

/// A bound, not yet serving, HTTP server.
pub struct Server {
    listener: TcpListener,
    app: Router,
    local_addr: SocketAddr,
    access_log: Arc<AccessLog>,
}

impl Server {
    /// Open the access log and bind the listener.
    ///
    /// # Errors
    ///
    /// - `StartupError::AccessLog` if `{log_dir}/access.log` cannot be created or opened
    /// - `StartupError::Bind` if the listener cannot bind
    pub async fn bind(
        config: &OvalDictConfig,
        store: Arc<dyn DefinitionStore>,
    ) -> Result<Self, OvalDictError> {
        let access_log = Arc::new(AccessLog::open(&config.general.log_dir)?);

        let bind_url = config.server.bind_url();
        let listener = TcpListener::bind(&bind_url)
            .await
            .map_err(|source| StartupError::Bind {
                addr: bind_url.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind {
                addr: bind_url,
                source,
            })?;

        let state = AppState::new(store, config.store.error_policy);
        let app = build_router(state, Arc::clone(&access_log));

        Ok(Self {
            listener,
            app,
            local_addr,
            access_log,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The access log opened for this server.
    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    /// Serve requests until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), OvalDictError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %self.local_addr, "Listening on {}", self.local_addr);

        axum::serve(
            self.listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Start the HTTP server and serve until Ctrl-C.
pub async fn start(
    config: &OvalDictConfig,
    store: Arc<dyn DefinitionStore>,
) -> Result<(), OvalDictError> {
    Server::bind(config, store)
        .await?
        .run_until(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
