//! Retrieval of cluster objects
//!
//! The engine only sees the [`ClusterSource`] trait. The production
//! implementation talks to the Kubernetes API through `kube`; tests use an
//! in-memory source.

mod convert;
mod kube_source;

pub use convert::{
    deployment_descriptor, node_descriptor, pod_placement, resource_descriptor,
    stateful_set_descriptor,
};
pub use kube_source::{KubeClusterSource, RESOURCE_WHITELIST};

use crate::error::Result;
use crate::models::{NodeDescriptor, PodPlacement, ResourceDescriptor, WorkloadDescriptor, WorkloadKind};
use async_trait::async_trait;

/// Read-only list operations against a cluster.
///
/// An empty `field_selector` means no server-side filtering.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Names of all namespaces
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// All nodes with labels, capacity and system info
    async fn list_nodes(&self) -> Result<Vec<NodeDescriptor>>;

    /// Pods across all namespaces
    async fn list_pods(&self, field_selector: &str) -> Result<Vec<PodPlacement>>;

    /// Workloads of one kind across all namespaces
    async fn list_workloads(
        &self,
        kind: WorkloadKind,
        field_selector: &str,
    ) -> Result<Vec<WorkloadDescriptor>>;

    /// Every object of the whitelisted resource types. Field selectors do not
    /// apply here; callers filter namespaces themselves.
    async fn list_resources(&self) -> Result<Vec<ResourceDescriptor>>;
}
