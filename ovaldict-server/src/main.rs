use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use ovaldict_server::cli::ServerCli;
use ovaldict_server::{logging, metrics_server, server};
use ovaldict_store::DefinitionDb;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();

    let config = cli
        .resolve_config()
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ovaldict-server starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let db_path = PathBuf::from(&config.store.db_path);
    let db = tokio::task::spawn_blocking(move || DefinitionDb::load_from_dir(&db_path))
        .await?
        .map_err(|e| anyhow::anyhow!("failed to load definition db: {}", e))?;
    tracing::info!(
        definitions = db.definition_count(),
        families = ?db.families(),
        "definition db loaded"
    );

    server::start(&config, Arc::new(db)).await?;

    tracing::info!("ovaldict-server shut down");
    Ok(())
}
