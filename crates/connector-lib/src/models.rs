//! Core data models for the connector
//!
//! These are the engine's own snapshots of cluster objects. The retrieval
//! layer converts API objects into them, so nothing below depends on the
//! wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";
pub const REGION_LABEL: &str = "topology.kubernetes.io/region";
pub const INSTANCE_TYPE_LABEL: &str = "node.kubernetes.io/instance-type";

pub const LEGACY_ZONE_LABEL: &str = "failure-domain.beta.kubernetes.io/zone";
pub const LEGACY_REGION_LABEL: &str = "failure-domain.beta.kubernetes.io/region";
pub const LEGACY_INSTANCE_TYPE_LABEL: &str = "beta.kubernetes.io/instance-type";

/// System information reported by a node's kubelet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSystemInfo {
    pub architecture: String,
    pub container_runtime_version: String,
    pub kernel_version: String,
    pub kubelet_version: String,
    pub operating_system: String,
    pub os_image: String,
}

/// Snapshot of a single compute node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    /// Raw CPU capacity quantity, e.g. `4`
    pub cpu_capacity: Option<String>,
    /// Raw memory capacity quantity, e.g. `16393476Ki`
    pub memory_capacity: Option<String>,
    pub system_info: NodeSystemInfo,
    pub created_at: Option<DateTime<Utc>>,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Topology label lookup, preferring the stable key over the legacy one.
    /// Missing labels read as the empty string.
    fn topology_label(&self, stable: &str, legacy: &str) -> &str {
        self.labels
            .get(stable)
            .or_else(|| self.labels.get(legacy))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn zone(&self) -> &str {
        self.topology_label(ZONE_LABEL, LEGACY_ZONE_LABEL)
    }

    pub fn region(&self) -> &str {
        self.topology_label(REGION_LABEL, LEGACY_REGION_LABEL)
    }

    pub fn instance_type(&self) -> &str {
        self.topology_label(INSTANCE_TYPE_LABEL, LEGACY_INSTANCE_TYPE_LABEL)
    }
}

/// Workload kinds that get a redundancy classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 2] = [WorkloadKind::Deployment, WorkloadKind::StatefulSet];

    /// Record type tag used in the output document
    pub fn tag(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployment",
            WorkloadKind::StatefulSet => "statefulSet",
        }
    }

    /// Plural API resource name
    pub fn resource(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployments",
            WorkloadKind::StatefulSet => "statefulsets",
        }
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, WorkloadKind::StatefulSet)
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Conjunction of label equality constraints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSelector {
    pub match_labels: BTreeMap<String, String>,
}

impl PodSelector {
    pub fn new(match_labels: BTreeMap<String, String>) -> Self {
        Self { match_labels }
    }

    /// True when every constraint is satisfied by `labels`. An empty
    /// selector matches everything.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

/// Snapshot of a deployment or stateful set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDescriptor {
    pub kind: WorkloadKind,
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// Observed replica count from the workload status
    pub replicas: u32,
    pub selector: PodSelector,
}

/// The parts of a pod needed for placement resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodPlacement {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// Empty or absent until the pod is scheduled
    pub node_name: Option<String>,
}

/// Any other listed API object, reduced to identity and labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: String,
    pub uid: String,
    pub name: String,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_topology_prefers_stable_labels() {
        let mut node = NodeDescriptor::new("nodepool-1");
        node.labels = labels(&[(ZONE_LABEL, "westeurope-1"), (LEGACY_ZONE_LABEL, "1")]);
        assert_eq!(node.zone(), "westeurope-1");
    }

    #[test]
    fn test_topology_falls_back_to_legacy_labels() {
        let mut node = NodeDescriptor::new("nodepool-1");
        node.labels = labels(&[
            (LEGACY_REGION_LABEL, "westeurope"),
            (LEGACY_INSTANCE_TYPE_LABEL, "Standard_D2s_v3"),
        ]);
        assert_eq!(node.region(), "westeurope");
        assert_eq!(node.instance_type(), "Standard_D2s_v3");
        assert_eq!(node.zone(), "");
    }

    #[test]
    fn test_selector_requires_every_label() {
        let selector = PodSelector::new(labels(&[("app", "web"), ("tier", "frontend")]));

        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "frontend"), ("x", "y")])));
        assert!(!selector.matches(&labels(&[("app", "web")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("tier", "backend")])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = PodSelector::default();
        assert!(selector.matches(&BTreeMap::new()));
        assert!(selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_workload_kind_tags() {
        assert_eq!(WorkloadKind::Deployment.tag(), "deployment");
        assert_eq!(WorkloadKind::StatefulSet.tag(), "statefulSet");
        assert!(WorkloadKind::StatefulSet.is_stateful());
        assert!(!WorkloadKind::Deployment.is_stateful());
    }
}
