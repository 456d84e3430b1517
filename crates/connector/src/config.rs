//! Connector configuration
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! config file, `CONNECTOR_*` environment variables, explicit CLI flags.

use clap::Args;
use config::{Config, Environment, File, Map};
use connector_lib::storage::AzureBlobOptions;
use connector_lib::{BackendKind, InventorySettings, StorageOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "CONNECTOR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Values given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Name of the cluster, used as the cluster record id
    #[arg(long)]
    pub cluster_name: Option<String>,

    /// Identifier of this connector instance
    #[arg(long)]
    pub connector_id: Option<String>,

    /// Version reported in the output document
    #[arg(long)]
    pub connector_version: Option<String>,

    /// Workspace the document is destined for
    #[arg(long)]
    pub workspace: Option<String>,

    /// Storage backend: file or azureblob
    #[arg(long, value_parser = ["file", "azureblob"])]
    pub storage_backend: Option<String>,

    /// Directory for the file backend
    #[arg(long)]
    pub local_file_path: Option<String>,

    #[arg(long)]
    pub azure_account_name: Option<String>,

    #[arg(long)]
    pub azure_account_key: Option<String>,

    #[arg(long)]
    pub azure_container: Option<String>,

    /// Blob service URL override
    #[arg(long)]
    pub azure_endpoint: Option<String>,

    /// Namespace patterns to exclude, comma separated (`*` wildcard)
    #[arg(long, value_delimiter = ',')]
    pub blacklist_namespaces: Option<Vec<String>>,

    /// Use the local kubeconfig instead of the in-cluster service account
    #[arg(long)]
    pub local: bool,

    /// Also inventory the generic resource whitelist
    #[arg(long)]
    pub scan_resources: bool,
}

/// Resolved connector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub cluster_name: String,

    #[serde(default)]
    pub connector_id: String,

    #[serde(default = "default_connector_version")]
    pub connector_version: String,

    #[serde(default)]
    pub workspace: String,

    #[serde(default)]
    pub storage_backend: BackendKind,

    #[serde(default = "default_local_file_path")]
    pub local_file_path: PathBuf,

    #[serde(default)]
    pub azure_account_name: String,

    #[serde(default)]
    pub azure_account_key: String,

    #[serde(default)]
    pub azure_container: String,

    #[serde(default)]
    pub azure_endpoint: Option<String>,

    #[serde(default)]
    pub blacklist_namespaces: Vec<String>,

    #[serde(default)]
    pub local: bool,

    #[serde(default)]
    pub scan_resources: bool,
}

fn default_connector_version() -> String {
    "1.0.0".to_string()
}

fn default_local_file_path() -> PathBuf {
    PathBuf::from(".")
}

impl ConnectorConfig {
    /// Load and validate configuration from every layer
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(file, overrides, None)
    }

    fn load_with_env(
        file: Option<&Path>,
        overrides: &Overrides,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("connector_version", default_connector_version())?
            .set_default("storage_backend", BackendKind::File.as_str())?
            .set_default("local_file_path", ".")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("blacklist_namespaces")
                    .source(env),
            )
            .set_override_option("cluster_name", overrides.cluster_name.clone())?
            .set_override_option("connector_id", overrides.connector_id.clone())?
            .set_override_option("connector_version", overrides.connector_version.clone())?
            .set_override_option("workspace", overrides.workspace.clone())?
            .set_override_option("storage_backend", overrides.storage_backend.clone())?
            .set_override_option("local_file_path", overrides.local_file_path.clone())?
            .set_override_option("azure_account_name", overrides.azure_account_name.clone())?
            .set_override_option("azure_account_key", overrides.azure_account_key.clone())?
            .set_override_option("azure_container", overrides.azure_container.clone())?
            .set_override_option("azure_endpoint", overrides.azure_endpoint.clone())?
            .set_override_option(
                "blacklist_namespaces",
                overrides.blacklist_namespaces.clone(),
            )?
            .set_override_option("local", overrides.local.then_some(true))?
            .set_override_option("scan_resources", overrides.scan_resources.then_some(true))?;

        let config: ConnectorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Report the first missing required key
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut required = vec![
            ("cluster_name", &self.cluster_name),
            ("connector_id", &self.connector_id),
            ("workspace", &self.workspace),
        ];
        if self.storage_backend == BackendKind::AzureBlob {
            required.push(("azure_account_name", &self.azure_account_name));
            required.push(("azure_account_key", &self.azure_account_key));
            required.push(("azure_container", &self.azure_container));
        }

        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::Missing(key)),
            None => Ok(()),
        }
    }

    pub fn inventory_settings(&self) -> InventorySettings {
        InventorySettings {
            cluster_name: self.cluster_name.clone(),
            blacklist_patterns: self.blacklist_namespaces.clone(),
            scan_resources: self.scan_resources,
        }
    }

    pub fn storage_options(&self) -> StorageOptions {
        let azure = (self.storage_backend == BackendKind::AzureBlob).then(|| AzureBlobOptions {
            account_name: self.azure_account_name.clone(),
            account_key: self.azure_account_key.clone(),
            container: self.azure_container.clone(),
            endpoint: self.azure_endpoint.clone(),
        });

        StorageOptions {
            kind: self.storage_backend,
            local_path: self.local_file_path.clone(),
            azure,
        }
    }
}
