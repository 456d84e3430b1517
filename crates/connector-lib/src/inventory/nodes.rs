//! Node aggregation
//!
//! Reduces the node inventory into a single cluster summary in one pass.

use crate::error::{ConnectorError, Result};
use crate::models::NodeDescriptor;
use crate::quantity::parse_quantity_i64;
use crate::set::StringSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Cluster-level view over all nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSummary {
    /// Region of the first node in the inventory. `None` when there are no
    /// nodes.
    pub data_center: Option<String>,
    pub availability_zones: StringSet,
    pub node_types: StringSet,
    pub number_nodes: usize,
    pub cpu_capacity: i64,
    pub memory_capacity_gb: f64,
    /// Every observed value per node label key
    pub labels: BTreeMap<String, StringSet>,
    pub architectures: StringSet,
    pub container_runtime_versions: StringSet,
    pub kernel_versions: StringSet,
    pub kubelet_versions: StringSet,
    pub operating_systems: StringSet,
    pub os_images: StringSet,
    pub first_created_node: Option<DateTime<Utc>>,
    pub last_created_node: Option<DateTime<Utc>>,
}

/// Aggregate the node inventory into a [`ClusterSummary`].
///
/// An empty inventory yields the zero-valued summary. A capacity value that
/// is not an exact integer aborts the whole aggregation.
pub fn aggregate_nodes(nodes: &[NodeDescriptor]) -> Result<ClusterSummary> {
    let Some(first) = nodes.first() else {
        return Ok(ClusterSummary::default());
    };

    let mut summary = ClusterSummary {
        // Assumes a single-region cluster; other nodes are not consulted.
        data_center: Some(first.region().to_string()),
        number_nodes: nodes.len(),
        ..Default::default()
    };

    for node in nodes {
        summary.availability_zones.add(node.zone());
        summary.node_types.add(node.instance_type());

        let info = &node.system_info;
        summary.architectures.add(info.architecture.as_str());
        summary
            .container_runtime_versions
            .add(info.container_runtime_version.as_str());
        summary.kernel_versions.add(info.kernel_version.as_str());
        summary.kubelet_versions.add(info.kubelet_version.as_str());
        summary.operating_systems.add(info.operating_system.as_str());
        summary.os_images.add(info.os_image.as_str());

        if let Some(created) = node.created_at {
            summary.first_created_node = Some(match summary.first_created_node {
                Some(current) => current.min(created),
                None => created,
            });
            summary.last_created_node = Some(match summary.last_created_node {
                Some(current) => current.max(created),
                None => created,
            });
        }
    }

    summary.memory_capacity_gb = aggregate_memory_capacity(nodes)?;
    summary.cpu_capacity = aggregate_cpu_capacity(nodes)?;
    summary.labels = label_sets(nodes);

    debug!(
        nodes = summary.number_nodes,
        zones = summary.availability_zones.len(),
        cpu = summary.cpu_capacity,
        memory_gb = summary.memory_capacity_gb,
        "Aggregated node inventory"
    );

    Ok(summary)
}

/// Sum of node memory capacity in GiB.
///
/// Each node's bytes are converted before summing; the float rounding is
/// accepted since the figure is informational.
pub fn aggregate_memory_capacity(nodes: &[NodeDescriptor]) -> Result<f64> {
    let mut total = 0.0;
    for node in nodes {
        let bytes = capacity_of(node, "memory", node.memory_capacity.as_deref())?;
        total += byte_to_gib(bytes);
    }
    Ok(total)
}

/// Sum of node CPU capacity in whole cores
pub fn aggregate_cpu_capacity(nodes: &[NodeDescriptor]) -> Result<i64> {
    let mut total: i64 = 0;
    for node in nodes {
        let cores = capacity_of(node, "cpu", node.cpu_capacity.as_deref())?;
        total = total.checked_add(cores).ok_or_else(|| ConnectorError::Quantity {
            node: node.name.clone(),
            resource: "cpu".to_string(),
            value: "sum exceeds i64".to_string(),
        })?;
    }
    Ok(total)
}

fn capacity_of(node: &NodeDescriptor, resource: &str, raw: Option<&str>) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(0);
    };

    parse_quantity_i64(raw).map_err(|err| {
        debug!(node = %node.name, resource = %resource, value = %raw, error = %err, "Unreadable capacity");
        ConnectorError::Quantity {
            node: node.name.clone(),
            resource: resource.to_string(),
            value: raw.to_string(),
        }
    })
}

fn byte_to_gib(bytes: i64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Collect, per label key, every distinct value seen across all nodes
pub fn label_sets(nodes: &[NodeDescriptor]) -> BTreeMap<String, StringSet> {
    let mut sets: BTreeMap<String, StringSet> = BTreeMap::new();
    for node in nodes {
        for (key, value) in &node.labels {
            sets.entry(key.clone()).or_default().add(value.as_str());
        }
    }
    sets
}
