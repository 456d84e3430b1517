//! Connector library for Kubernetes inventory snapshots
//!
//! This crate provides the core functionality for:
//! - Aggregating node descriptors into a cluster summary
//! - Resolving which nodes back each workload
//! - Classifying workload redundancy
//! - Mapping everything into a uniform output document
//! - Retrieval from the cluster API and persistence of the result

pub mod document;
pub mod error;
pub mod inventory;
pub mod mapper;
pub mod models;
pub mod namespaces;
pub mod observability;
pub mod pipeline;
pub mod quantity;
pub mod set;
pub mod source;
pub mod storage;

pub use document::{CustomFields, DocumentBuilder, OutputDocument};
pub use error::{ConnectorError, Result};
pub use mapper::{OutputRecord, OutputValue};
pub use models::*;
pub use observability::{init_tracing, LogBuffer, StructuredLogger};
pub use pipeline::{CollectedInventory, Inventory, InventorySettings};
pub use set::StringSet;
pub use source::{ClusterSource, KubeClusterSource};
pub use storage::{BackendKind, StorageBackend, StorageOptions};
