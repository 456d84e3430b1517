//! Persistence of the output document and the run log
//!
//! The backend is chosen once at startup. Both variants store the same two
//! files under fixed names.

mod azure;
mod local;

pub use azure::{AzureBlobOptions, AzureBlobStorage};
pub use local::LocalFileStorage;

use crate::error::{ConnectorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DOCUMENT_FILE_NAME: &str = "ldif.json";
pub const LOG_FILE_NAME: &str = "k8s-connector.log";

/// Storage backend selector as it appears in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    #[serde(rename = "azureblob")]
    AzureBlob,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::AzureBlob => "azureblob",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(BackendKind::File),
            "azureblob" => Ok(BackendKind::AzureBlob),
            other => Err(ConnectorError::storage(
                other,
                "unsupported storage backend type",
            )),
        }
    }
}

/// Everything needed to construct either backend
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    pub kind: BackendKind,
    pub local_path: PathBuf,
    pub azure: Option<AzureBlobOptions>,
}

/// Destination for the document and the captured log
#[derive(Debug)]
pub enum StorageBackend {
    LocalFile(LocalFileStorage),
    AzureBlob(AzureBlobStorage),
}

impl StorageBackend {
    pub async fn from_options(options: &StorageOptions) -> Result<Self> {
        match options.kind {
            BackendKind::File => Ok(StorageBackend::LocalFile(LocalFileStorage::new(
                &options.local_path,
            )?)),
            BackendKind::AzureBlob => {
                let azure = options.azure.as_ref().ok_or_else(|| {
                    ConnectorError::storage(
                        BackendKind::AzureBlob.as_str(),
                        "azure storage options must be set when using azure as storage target",
                    )
                })?;
                Ok(StorageBackend::AzureBlob(AzureBlobStorage::new(azure.clone()).await?))
            }
        }
    }

    /// Store the serialized document
    pub async fn upload_document(&self, content: &[u8]) -> Result<()> {
        self.upload(DOCUMENT_FILE_NAME, content).await
    }

    /// Store the captured run log
    pub async fn upload_log(&self, content: &[u8]) -> Result<()> {
        self.upload(LOG_FILE_NAME, content).await
    }

    async fn upload(&self, name: &str, content: &[u8]) -> Result<()> {
        match self {
            StorageBackend::LocalFile(storage) => storage.write(name, content).await,
            StorageBackend::AzureBlob(storage) => storage.put_blob(name, content).await,
        }
    }

    /// Human readable destination, used in log events
    pub fn describe(&self) -> String {
        match self {
            StorageBackend::LocalFile(storage) => storage.path().display().to_string(),
            StorageBackend::AzureBlob(storage) => storage.container_url(),
        }
    }
}
