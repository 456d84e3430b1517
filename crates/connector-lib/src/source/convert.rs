//! Conversion of API objects into engine descriptors

use crate::models::{
    NodeDescriptor, NodeSystemInfo, PodPlacement, PodSelector, ResourceDescriptor,
    WorkloadDescriptor, WorkloadKind,
};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::DynamicObject;
use std::collections::BTreeMap;

fn labels_of(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}

fn selector_of(selector: Option<&LabelSelector>) -> PodSelector {
    PodSelector::new(
        selector
            .and_then(|s| s.match_labels.clone())
            .unwrap_or_default(),
    )
}

fn observed_replicas(replicas: Option<i32>) -> u32 {
    replicas.unwrap_or(0).max(0) as u32
}

pub fn node_descriptor(node: &Node) -> NodeDescriptor {
    let status = node.status.as_ref();
    let capacity = status.and_then(|s| s.capacity.as_ref());
    let info = status.and_then(|s| s.node_info.as_ref());

    NodeDescriptor {
        name: node.metadata.name.clone().unwrap_or_default(),
        labels: labels_of(&node.metadata),
        cpu_capacity: capacity.and_then(|c| c.get("cpu")).map(|q| q.0.clone()),
        memory_capacity: capacity.and_then(|c| c.get("memory")).map(|q| q.0.clone()),
        system_info: info
            .map(|i| NodeSystemInfo {
                architecture: i.architecture.clone(),
                container_runtime_version: i.container_runtime_version.clone(),
                kernel_version: i.kernel_version.clone(),
                kubelet_version: i.kubelet_version.clone(),
                operating_system: i.operating_system.clone(),
                os_image: i.os_image.clone(),
            })
            .unwrap_or_default(),
        created_at: node.metadata.creation_timestamp.as_ref().map(|t| t.0),
    }
}

pub fn pod_placement(pod: &Pod) -> PodPlacement {
    PodPlacement {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        labels: labels_of(&pod.metadata),
        node_name: pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .filter(|n| !n.is_empty()),
    }
}

pub fn deployment_descriptor(deployment: &Deployment) -> WorkloadDescriptor {
    WorkloadDescriptor {
        kind: WorkloadKind::Deployment,
        uid: deployment.metadata.uid.clone().unwrap_or_default(),
        name: deployment.metadata.name.clone().unwrap_or_default(),
        namespace: deployment.metadata.namespace.clone().unwrap_or_default(),
        labels: labels_of(&deployment.metadata),
        replicas: observed_replicas(deployment.status.as_ref().and_then(|s| s.replicas)),
        selector: selector_of(deployment.spec.as_ref().map(|s| &s.selector)),
    }
}

pub fn stateful_set_descriptor(stateful_set: &StatefulSet) -> WorkloadDescriptor {
    WorkloadDescriptor {
        kind: WorkloadKind::StatefulSet,
        uid: stateful_set.metadata.uid.clone().unwrap_or_default(),
        name: stateful_set.metadata.name.clone().unwrap_or_default(),
        namespace: stateful_set.metadata.namespace.clone().unwrap_or_default(),
        labels: labels_of(&stateful_set.metadata),
        replicas: observed_replicas(stateful_set.status.as_ref().map(|s| s.replicas)),
        selector: selector_of(stateful_set.spec.as_ref().map(|s| &s.selector)),
    }
}

pub fn resource_descriptor(kind: &str, object: &DynamicObject) -> ResourceDescriptor {
    let kind = object
        .types
        .as_ref()
        .map(|t| t.kind.clone())
        .unwrap_or_else(|| kind.to_string());

    ResourceDescriptor {
        kind,
        uid: object.metadata.uid.clone().unwrap_or_default(),
        name: object.metadata.name.clone().unwrap_or_default(),
        namespace: object.metadata.namespace.clone().filter(|ns| !ns.is_empty()),
        labels: labels_of(&object.metadata),
    }
}
