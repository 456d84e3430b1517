use super::convert::{
    deployment_descriptor, node_descriptor, pod_placement, resource_descriptor,
    stateful_set_descriptor,
};
use super::ClusterSource;
use crate::error::{ConnectorError, Result};
use crate::models::{NodeDescriptor, PodPlacement, ResourceDescriptor, WorkloadDescriptor, WorkloadKind};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::{
    api::{Api, DynamicObject, ListParams},
    config::{Config, KubeConfigOptions},
    discovery::{verbs, Discovery},
    Client,
};
use tracing::{debug, info};

/// Group and plural name of every resource type picked up by the generic
/// scan. Deployments, statefulsets and nodes have dedicated records and are
/// not listed here.
pub const RESOURCE_WHITELIST: &[(&str, &str)] = &[
    ("", "serviceaccounts"),
    ("", "services"),
    ("", "pods"),
    ("", "namespaces"),
    ("", "configmaps"),
    ("", "persistentvolumes"),
    ("", "persistentvolumeclaims"),
    ("", "replicationcontrollers"),
    ("apps", "daemonsets"),
    ("apps", "replicasets"),
    ("apiextensions.k8s.io", "customresourcedefinitions"),
    ("rbac.authorization.k8s.io", "clusterrolebindings"),
    ("rbac.authorization.k8s.io", "rolebindings"),
    ("rbac.authorization.k8s.io", "clusterroles"),
    ("rbac.authorization.k8s.io", "roles"),
    ("networking.k8s.io", "ingresses"),
    ("networking.k8s.io", "networkpolicies"),
    ("autoscaling", "horizontalpodautoscalers"),
    ("storage.k8s.io", "storageclasses"),
    ("batch", "cronjobs"),
    ("batch", "jobs"),
];

fn is_whitelisted(group: &str, plural: &str) -> bool {
    RESOURCE_WHITELIST
        .iter()
        .any(|(g, p)| *g == group && *p == plural)
}

fn list_params(field_selector: &str) -> ListParams {
    if field_selector.is_empty() {
        ListParams::default()
    } else {
        ListParams::default().fields(field_selector)
    }
}

/// Cluster source backed by the Kubernetes API.
pub struct KubeClusterSource {
    client: Client,
}

impl KubeClusterSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect with the service account the pod runs under.
    pub fn in_cluster() -> Result<Self> {
        let config = Config::incluster()
            .map_err(|e| ConnectorError::retrieval("in-cluster configuration", e))?;
        let client = Client::try_from(config)?;
        debug!("Kubernetes client initialized from in-cluster configuration");
        Ok(Self::new(client))
    }

    /// Connect with the local kubeconfig (`KUBECONFIG` or `~/.kube/config`).
    pub async fn from_kubeconfig() -> Result<Self> {
        let config = Config::from_kubeconfig(&KubeConfigOptions::default())
            .await
            .map_err(|e| ConnectorError::retrieval("kubeconfig", e))?;
        let client = Client::try_from(config)?;
        debug!("Kubernetes client initialized from kubeconfig");
        Ok(Self::new(client))
    }

    pub async fn connect(local: bool) -> Result<Self> {
        if local {
            Self::from_kubeconfig().await
        } else {
            Self::in_cluster()
        }
    }
}

#[async_trait]
impl ClusterSource for KubeClusterSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(|e| ConnectorError::retrieval("namespaces", e))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    async fn list_nodes(&self) -> Result<Vec<NodeDescriptor>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .map_err(|e| ConnectorError::retrieval("nodes", e))?;

        Ok(list.items.iter().map(node_descriptor).collect())
    }

    async fn list_pods(&self, field_selector: &str) -> Result<Vec<PodPlacement>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&list_params(field_selector))
            .await
            .map_err(|e| ConnectorError::retrieval("pods", e))?;

        Ok(list.items.iter().map(pod_placement).collect())
    }

    async fn list_workloads(
        &self,
        kind: WorkloadKind,
        field_selector: &str,
    ) -> Result<Vec<WorkloadDescriptor>> {
        let params = list_params(field_selector);
        match kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::all(self.client.clone());
                let list = api
                    .list(&params)
                    .await
                    .map_err(|e| ConnectorError::retrieval(kind.resource(), e))?;
                Ok(list.items.iter().map(deployment_descriptor).collect())
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> = Api::all(self.client.clone());
                let list = api
                    .list(&params)
                    .await
                    .map_err(|e| ConnectorError::retrieval(kind.resource(), e))?;
                Ok(list.items.iter().map(stateful_set_descriptor).collect())
            }
        }
    }

    async fn list_resources(&self) -> Result<Vec<ResourceDescriptor>> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| ConnectorError::retrieval("API discovery", e))?;

        let mut resources = Vec::new();
        for group in discovery.groups() {
            for (ar, caps) in group.recommended_resources() {
                if !is_whitelisted(&ar.group, &ar.plural) || !caps.supports_operation(verbs::LIST) {
                    debug!(group = %ar.group, version = %ar.version, resource = %ar.plural, "Not scanning resource");
                    continue;
                }

                let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);
                let list = api
                    .list(&ListParams::default())
                    .await
                    .map_err(|e| ConnectorError::retrieval(ar.plural.as_str(), e))?;

                debug!(resource = %ar.plural, count = list.items.len(), "Scanned resource");
                resources.extend(list.items.iter().map(|obj| resource_descriptor(&ar.kind, obj)));
            }
        }

        info!(count = resources.len(), "Generic resource scan finished");
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_excludes_dedicated_kinds() {
        assert!(is_whitelisted("", "services"));
        assert!(is_whitelisted("batch", "cronjobs"));
        assert!(!is_whitelisted("apps", "deployments"));
        assert!(!is_whitelisted("apps", "statefulsets"));
        assert!(!is_whitelisted("", "nodes"));
        assert!(!is_whitelisted("apps", "services"));
    }

    #[test]
    fn test_list_params_field_selector() {
        assert_eq!(list_params("").field_selector, None);
        assert_eq!(
            list_params("metadata.namespace!=kube-system").field_selector.as_deref(),
            Some("metadata.namespace!=kube-system")
        );
    }
}
