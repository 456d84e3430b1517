//! Workload placement resolution
//!
//! Finds the nodes that currently host a workload's pods. The pod and node
//! inventories are fetched once per run and shared across all workloads.

use crate::models::{NodeDescriptor, PodPlacement, PodSelector};
use crate::set::StringSet;
use tracing::trace;

/// Nodes occupied by one workload's pods
#[derive(Debug, Clone, Default)]
pub struct Placement<'a> {
    pub node_names: StringSet,
    pub nodes: Vec<&'a NodeDescriptor>,
}

impl Placement<'_> {
    /// Distinct zones of the resolved nodes
    pub fn zones(&self) -> StringSet {
        self.nodes.iter().map(|n| n.zone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty()
    }
}

/// Resolves pod selectors against a fixed pod and node inventory
pub struct PlacementResolver<'a> {
    pods: &'a [PodPlacement],
    nodes: &'a [NodeDescriptor],
}

impl<'a> PlacementResolver<'a> {
    pub fn new(pods: &'a [PodPlacement], nodes: &'a [NodeDescriptor]) -> Self {
        Self { pods, nodes }
    }

    /// Names of the nodes running pods that satisfy `selector`.
    /// Unscheduled pods contribute nothing.
    pub fn node_names(&self, selector: &PodSelector) -> StringSet {
        let mut names = StringSet::new();
        for pod in self.pods.iter().filter(|p| selector.matches(&p.labels)) {
            match pod.node_name.as_deref() {
                Some(node) if !node.is_empty() => names.add(node),
                _ => trace!(pod = %pod.name, namespace = %pod.namespace, "Pod not scheduled yet"),
            }
        }
        names
    }

    /// Full descriptors for the given node names, in inventory order
    pub fn nodes_by_name(&self, names: &StringSet) -> Vec<&'a NodeDescriptor> {
        self.nodes
            .iter()
            .filter(|n| names.contains(&n.name))
            .collect()
    }

    pub fn resolve(&self, selector: &PodSelector) -> Placement<'a> {
        let node_names = self.node_names(selector);
        let nodes = self.nodes_by_name(&node_names);
        Placement { node_names, nodes }
    }
}
