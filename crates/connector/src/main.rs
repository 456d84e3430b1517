//! Kubernetes Connector
//!
//! Runs once per invocation: inventories the cluster, writes the resulting
//! document to the configured storage backend and exits.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use connector_lib::{
    init_tracing, DocumentBuilder, Inventory, KubeClusterSource, LogBuffer, StorageBackend,
    StructuredLogger,
};
use crate::config::{ConnectorConfig, Overrides};
use std::path::PathBuf;
use tracing::{error, info};

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Kubernetes Connector
#[derive(Parser)]
#[command(name = "k8s-connector")]
#[command(author, version, about = "Inventories a Kubernetes cluster into a connector document", long_about = None)]
struct Cli {
    /// Configuration file (any format the config loader understands)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_buffer = LogBuffer::new();
    init_tracing(cli.verbose, &log_buffer).context("Failed to initialize logging")?;

    if let Err(e) = run(cli, &log_buffer).await {
        error!(error = %format!("{:#}", e), "Connector run failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, log_buffer: &LogBuffer) -> Result<()> {
    let config = ConnectorConfig::load(cli.config.as_deref(), &cli.overrides)
        .context("Invalid configuration")?;

    let logger = StructuredLogger::new(&config.cluster_name);
    logger.log_startup(&config.connector_version, &config.connector_id, &config.workspace);

    let source = KubeClusterSource::connect(config.local)
        .await
        .context("Failed to create Kubernetes client")?;
    let inventory = Inventory::new(source, config.inventory_settings());
    let collected = inventory
        .collect()
        .await
        .context("Failed to inventory cluster")?;

    let document = DocumentBuilder::new(&config.connector_version)
        .workspace(&config.workspace)
        .connector_instance(&config.connector_id)
        .build_version(BUILD_VERSION)
        .build(collected.cluster, collected.records);
    let records = document.content.len();
    let bytes = document
        .to_json_bytes()
        .context("Failed to serialize document")?;

    let backend = StorageBackend::from_options(&config.storage_options())
        .await
        .context("Failed to initialize storage backend")?;
    info!(backend = %config.storage_backend, target = %backend.describe(), "Storage backend ready");

    if let Err(e) = backend.upload_document(&bytes).await {
        logger.log_upload(&backend.describe(), bytes.len(), false);
        return Err(e).context("Failed to upload document");
    }
    logger.log_upload(&backend.describe(), bytes.len(), true);
    logger.log_finished(records);

    backend
        .upload_log(&log_buffer.contents())
        .await
        .context("Failed to upload log")?;

    Ok(())
}
