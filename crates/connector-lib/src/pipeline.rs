//! One inventory run
//!
//! Ties retrieval, aggregation, classification and mapping together. Every
//! list call happens exactly once and in a fixed order; the first failure
//! aborts the run.

use crate::error::Result;
use crate::inventory::{aggregate_nodes, classify, PlacementResolver};
use crate::mapper::{map_cluster, map_resource, map_workload, OutputRecord};
use crate::models::WorkloadKind;
use crate::namespaces::{field_selector_for, is_excluded, NamespaceFilter};
use crate::observability::StructuredLogger;
use crate::set::StringSet;
use crate::source::ClusterSource;
use tracing::debug;

/// Inputs of a run that do not come from the cluster
#[derive(Debug, Clone, Default)]
pub struct InventorySettings {
    pub cluster_name: String,
    pub blacklist_patterns: Vec<String>,
    /// Also inventory the generic resource whitelist
    pub scan_resources: bool,
}

/// Records produced by a run
#[derive(Debug, Clone)]
pub struct CollectedInventory {
    pub cluster: OutputRecord,
    /// Workload records first, then generic resources, in discovery order
    pub records: Vec<OutputRecord>,
    pub blacklist: StringSet,
}

pub struct Inventory<S: ClusterSource> {
    source: S,
    settings: InventorySettings,
    logger: StructuredLogger,
}

impl<S: ClusterSource> Inventory<S> {
    pub fn new(source: S, settings: InventorySettings) -> Self {
        let logger = StructuredLogger::new(settings.cluster_name.as_str());
        Self {
            source,
            settings,
            logger,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn collect(&self) -> Result<CollectedInventory> {
        let cluster_name = self.settings.cluster_name.as_str();

        let filter = NamespaceFilter::new(&self.settings.blacklist_patterns)?;
        let namespaces = self.source.list_namespaces().await?;
        let blacklist = filter.realize(&namespaces);
        self.logger.log_blacklist(&blacklist.sorted_items());
        let field_selector = field_selector_for(&blacklist);
        debug!(field_selector = %field_selector, "Namespace field selector");

        let nodes = self.source.list_nodes().await?;
        let summary = aggregate_nodes(&nodes)?;
        self.logger
            .log_cluster_summary(nodes.len(), summary.cpu_capacity, summary.memory_capacity_gb);
        let cluster = map_cluster(cluster_name, &summary);

        // Pod selectors are matched cluster-wide, so pods are listed unfiltered.
        let pods = self.source.list_pods("").await?;
        debug!(count = pods.len(), "Listed pods");
        let resolver = PlacementResolver::new(&pods, &nodes);

        let mut records = Vec::new();
        for kind in WorkloadKind::ALL {
            let workloads = self.source.list_workloads(kind, &field_selector).await?;
            let mut redundant = 0;
            for workload in &workloads {
                let placement = resolver.resolve(&workload.selector);
                let redundancy = classify(workload.replicas, placement.nodes.iter().copied());
                debug!(
                    kind = %kind,
                    namespace = %workload.namespace,
                    name = %workload.name,
                    nodes = placement.node_names.len(),
                    zones = placement.zones().len(),
                    redundant = redundancy.is_redundant,
                    "Classified workload"
                );
                if redundancy.is_redundant {
                    redundant += 1;
                }
                records.push(map_workload(cluster_name, workload, redundancy));
            }
            self.logger.log_workloads(kind.tag(), workloads.len(), redundant);
        }

        if self.settings.scan_resources {
            let resources = self.source.list_resources().await?;
            let before = records.len();
            records.extend(
                resources
                    .iter()
                    .filter(|r| !is_excluded(&blacklist, r.namespace.as_deref()))
                    .map(|r| map_resource(cluster_name, r)),
            );
            debug!(
                listed = resources.len(),
                kept = records.len() - before,
                "Mapped generic resources"
            );
        }

        Ok(CollectedInventory {
            cluster,
            records,
            blacklist,
        })
    }
}
