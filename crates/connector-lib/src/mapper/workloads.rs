use super::OutputRecord;
use crate::inventory::Redundancy;
use crate::models::WorkloadDescriptor;

/// Map a classified workload into an output record.
///
/// Computed fields win over labels whose sanitized key collides with them.
pub fn map_workload(
    cluster_name: &str,
    workload: &WorkloadDescriptor,
    redundancy: Redundancy,
) -> OutputRecord {
    let mut record = OutputRecord::new(workload.kind.tag(), workload.uid.as_str());
    record.insert_labels(&workload.labels);

    record.insert("clusterName", cluster_name);
    record.insert("isStateful", workload.kind.is_stateful());
    record.insert("isRedundant", redundancy.is_redundant);
    record.insert("isRedundantAcrossNodes", redundancy.across_nodes);
    record.insert(
        "isRedundantAcrossAvailabilityZones",
        redundancy.across_zones,
    );

    record
}

/// Map a list of classified workloads, keeping their order
pub fn map_workloads<'a, I>(cluster_name: &str, workloads: I) -> Vec<OutputRecord>
where
    I: IntoIterator<Item = (&'a WorkloadDescriptor, Redundancy)>,
{
    workloads
        .into_iter()
        .map(|(workload, redundancy)| map_workload(cluster_name, workload, redundancy))
        .collect()
}
