use super::OutputRecord;
use crate::inventory::ClusterSummary;
use crate::set::StringSet;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

pub const CLUSTER_RECORD_TYPE: &str = "cluster";

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn list(set: &StringSet) -> Vec<String> {
    set.sorted_items()
}

/// Map the cluster summary into the single cluster record of a document
pub fn map_cluster(cluster_name: &str, summary: &ClusterSummary) -> OutputRecord {
    let mut record = OutputRecord::new(CLUSTER_RECORD_TYPE, cluster_name);

    record.insert("clusterName", cluster_name);
    if let Some(region) = &summary.data_center {
        record.insert("dataCenter", region.as_str());
    }
    record.insert("availabilityZones", list(&summary.availability_zones));
    record.insert("nodeTypes", list(&summary.node_types));
    record.insert("numberNodes", summary.number_nodes as i64);
    record.insert("memoryCapacityGB", summary.memory_capacity_gb);
    record.insert("cpuCapacity", summary.cpu_capacity);
    record.insert("architecture", list(&summary.architectures));
    record.insert(
        "containerRuntimeVersion",
        list(&summary.container_runtime_versions),
    );
    record.insert("kernelVersion", list(&summary.kernel_versions));
    record.insert("kubeletVersion", list(&summary.kubelet_versions));
    record.insert("operatingSystem", list(&summary.operating_systems));
    record.insert("osImage", list(&summary.os_images));

    let labels: BTreeMap<String, Vec<String>> = summary
        .labels
        .iter()
        .map(|(key, values)| (key.clone(), list(values)))
        .collect();
    record.insert("labels", labels);

    if let Some(first) = summary.first_created_node {
        record.insert("firstCreatedNode", timestamp(first));
    }
    if let Some(last) = summary.last_created_node {
        record.insert("lastCreatedNode", timestamp(last));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::aggregate_nodes;
    use crate::mapper::OutputValue;
    use crate::models::{NodeDescriptor, LEGACY_REGION_LABEL, LEGACY_ZONE_LABEL};
    use chrono::TimeZone;

    #[test]
    fn test_map_cluster() {
        let mut a = NodeDescriptor::new("nodepool-1");
        a.labels.insert(LEGACY_REGION_LABEL.to_string(), "westeurope".to_string());
        a.labels.insert(LEGACY_ZONE_LABEL.to_string(), "1".to_string());
        a.cpu_capacity = Some("2".to_string());
        a.memory_capacity = Some("1Gi".to_string());
        a.created_at = Some(Utc.with_ymd_and_hms(2019, 1, 18, 8, 55, 20).unwrap());
        let mut b = a.clone();
        b.name = "nodepool-2".to_string();
        b.labels.insert(LEGACY_ZONE_LABEL.to_string(), "2".to_string());
        b.created_at = Some(Utc.with_ymd_and_hms(2019, 1, 12, 8, 55, 20).unwrap());

        let summary = aggregate_nodes(&[a, b]).unwrap();
        let record = map_cluster("mycluster", &summary);

        assert_eq!(record.record_type, "cluster");
        assert_eq!(record.id, "mycluster");
        assert_eq!(
            record.get("clusterName"),
            Some(&OutputValue::String("mycluster".to_string()))
        );
        assert_eq!(
            record.get("dataCenter"),
            Some(&OutputValue::String("westeurope".to_string()))
        );
        assert_eq!(
            record.get("availabilityZones"),
            Some(&OutputValue::StringList(vec!["1".to_string(), "2".to_string()]))
        );
        assert_eq!(record.get("numberNodes"), Some(&OutputValue::Integer(2)));
        assert_eq!(record.get("cpuCapacity"), Some(&OutputValue::Integer(4)));
        assert_eq!(record.get("memoryCapacityGB"), Some(&OutputValue::Float(2.0)));
        assert_eq!(
            record.get("firstCreatedNode"),
            Some(&OutputValue::String("2019-01-12T08:55:20Z".to_string()))
        );
        assert_eq!(
            record.get("lastCreatedNode"),
            Some(&OutputValue::String("2019-01-18T08:55:20Z".to_string()))
        );

        match record.get("labels") {
            Some(OutputValue::LabelSets(labels)) => {
                // Nested label keys are not sanitized
                assert_eq!(labels[LEGACY_ZONE_LABEL], vec!["1", "2"]);
            }
            other => panic!("unexpected labels value: {other:?}"),
        }
    }

    #[test]
    fn test_map_empty_cluster() {
        let record = map_cluster("empty", &ClusterSummary::default());

        assert_eq!(record.id, "empty");
        assert!(record.get("dataCenter").is_none());
        assert!(record.get("firstCreatedNode").is_none());
        assert_eq!(record.get("numberNodes"), Some(&OutputValue::Integer(0)));
        assert_eq!(record.get("nodeTypes"), Some(&OutputValue::StringList(vec![])));
    }
}
