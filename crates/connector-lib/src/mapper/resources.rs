use super::OutputRecord;
use crate::models::ResourceDescriptor;

/// Map a generically listed API object into an output record
pub fn map_resource(cluster_name: &str, resource: &ResourceDescriptor) -> OutputRecord {
    let mut record = OutputRecord::new(resource.kind.as_str(), resource.uid.as_str());
    record.insert_labels(&resource.labels);

    record.insert("clusterName", cluster_name);
    record.insert("name", resource.name.as_str());
    if let Some(namespace) = &resource.namespace {
        record.insert("namespace", namespace.as_str());
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::OutputValue;
    use std::collections::BTreeMap;

    #[test]
    fn test_map_namespaced_resource() {
        let resource = ResourceDescriptor {
            kind: "ConfigMap".to_string(),
            uid: "cm-uid".to_string(),
            name: "settings".to_string(),
            namespace: Some("default".to_string()),
            labels: BTreeMap::from([("app.kubernetes.io/part-of".to_string(), "shop".to_string())]),
        };

        let record = map_resource("mycluster", &resource);
        assert_eq!(record.record_type, "ConfigMap");
        assert_eq!(record.id, "cm-uid");
        assert_eq!(
            record.get("namespace"),
            Some(&OutputValue::String("default".to_string()))
        );
        assert_eq!(
            record.get("app_kubernetes_io_part_of"),
            Some(&OutputValue::String("shop".to_string()))
        );
    }

    #[test]
    fn test_map_cluster_scoped_resource() {
        let resource = ResourceDescriptor {
            kind: "StorageClass".to_string(),
            uid: "sc-uid".to_string(),
            name: "managed-premium".to_string(),
            namespace: None,
            labels: BTreeMap::new(),
        };

        let record = map_resource("mycluster", &resource);
        assert!(record.get("namespace").is_none());
        assert_eq!(
            record.get("name"),
            Some(&OutputValue::String("managed-premium".to_string()))
        );
    }
}
