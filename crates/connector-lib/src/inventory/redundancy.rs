//! Workload redundancy classification

use crate::models::NodeDescriptor;
use crate::set::StringSet;

/// Fault-tolerance posture of a workload.
///
/// The three flags are computed independently of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redundancy {
    /// More than one observed replica
    pub is_redundant: bool,
    /// Pods spread over more than one node
    pub across_nodes: bool,
    /// Pods spread over more than one availability zone
    pub across_zones: bool,
}

/// Classify a workload from its observed replica count and resolved nodes.
///
/// With no resolved nodes both spread flags are false, whatever the replica
/// count says.
pub fn classify<'a, I>(replicas: u32, nodes: I) -> Redundancy
where
    I: IntoIterator<Item = &'a NodeDescriptor>,
{
    let mut node_names = StringSet::new();
    let mut zones = StringSet::new();
    for node in nodes {
        node_names.add(node.name.as_str());
        zones.add(node.zone());
    }

    Redundancy {
        is_redundant: replicas > 1,
        across_nodes: node_names.len() > 1,
        across_zones: zones.len() > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LEGACY_ZONE_LABEL;

    fn nodes(zones: &[&str]) -> Vec<NodeDescriptor> {
        zones
            .iter()
            .enumerate()
            .map(|(i, zone)| {
                let mut node = NodeDescriptor::new(format!("kubelet-{}", i));
                node.labels
                    .insert(LEGACY_ZONE_LABEL.to_string(), zone.to_string());
                node
            })
            .collect()
    }

    #[test]
    fn test_classification_table() {
        let cases = [
            ("single replica", 1, vec!["0"], (false, false, false)),
            ("replicas on one node", 2, vec!["0"], (true, false, false)),
            ("two nodes one zone", 2, vec!["0", "0"], (true, true, false)),
            ("two nodes two zones", 2, vec!["0", "1"], (true, true, true)),
        ];

        for (name, replicas, zones, (redundant, across_nodes, across_zones)) in cases {
            let inventory = nodes(&zones);
            let result = classify(replicas, &inventory);
            assert_eq!(result.is_redundant, redundant, "{name}");
            assert_eq!(result.across_nodes, across_nodes, "{name}");
            assert_eq!(result.across_zones, across_zones, "{name}");
        }
    }

    #[test]
    fn test_no_nodes_is_never_spread() {
        for replicas in [0, 1, 3] {
            let result = classify(replicas, std::iter::empty());
            assert!(!result.across_nodes);
            assert!(!result.across_zones);
            assert_eq!(result.is_redundant, replicas > 1);
        }
    }

    #[test]
    fn test_duplicate_descriptors_count_once() {
        let inventory = nodes(&["0"]);
        let result = classify(3, inventory.iter().chain(inventory.iter()));
        assert!(!result.across_nodes);
    }
}
