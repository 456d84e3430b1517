//! Output document assembly
//!
//! Wraps the mapped records with connector metadata. The cluster record is
//! always first, followed by every other record in discovery order.

use crate::mapper::OutputRecord;
use serde::{Deserialize, Serialize};

pub const CONNECTOR_ID: &str = "Kubernetes";
pub const CONNECTOR_TYPE: &str = "k8s-connector";
pub const PROCESSING_DIRECTION: &str = "inbound";
pub const FORMAT_VERSION: &str = "1.0.0";
pub const DEFAULT_DESCRIPTION: &str = "Map Kubernetes objects to catalog entries";

fn is_empty(value: &str) -> bool {
    value.is_empty()
}

/// Free-form fields identifying the connector instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFields {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub connector_instance: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub build_version: String,
}

/// The final document handed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub connector_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub connector_type: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub connector_version: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub processing_direction: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub lx_version: String,
    #[serde(rename = "lxWorkspace", default, skip_serializing_if = "is_empty")]
    pub workspace: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub description: String,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default)]
    pub content: Vec<OutputRecord>,
}

impl OutputDocument {
    /// Indented JSON bytes, the form storage receives
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Builder for [`OutputDocument`]
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    connector_version: String,
    workspace: String,
    description: String,
    custom_fields: CustomFields,
}

impl DocumentBuilder {
    pub fn new(connector_version: impl Into<String>) -> Self {
        Self {
            connector_version: connector_version.into(),
            workspace: String::new(),
            description: DEFAULT_DESCRIPTION.to_string(),
            custom_fields: CustomFields::default(),
        }
    }

    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn connector_instance(mut self, instance: impl Into<String>) -> Self {
        self.custom_fields.connector_instance = instance.into();
        self
    }

    pub fn build_version(mut self, version: impl Into<String>) -> Self {
        self.custom_fields.build_version = version.into();
        self
    }

    /// Assemble the document from the cluster record and the remaining
    /// records in discovery order.
    pub fn build(self, cluster: OutputRecord, records: Vec<OutputRecord>) -> OutputDocument {
        let mut content = Vec::with_capacity(records.len() + 1);
        content.push(cluster);
        content.extend(records);

        OutputDocument {
            connector_id: CONNECTOR_ID.to_string(),
            connector_type: CONNECTOR_TYPE.to_string(),
            connector_version: self.connector_version,
            processing_direction: PROCESSING_DIRECTION.to_string(),
            lx_version: FORMAT_VERSION.to_string(),
            workspace: self.workspace,
            description: self.description,
            custom_fields: self.custom_fields,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OutputDocument {
        let mut cluster = OutputRecord::new("cluster", "mycluster");
        cluster.insert("clusterName", "mycluster");
        let mut deployment = OutputRecord::new("deployment", "uid-1");
        deployment.insert("isRedundant", true);

        DocumentBuilder::new("1.0.0")
            .workspace("my-workspace")
            .connector_instance("connector-1")
            .build_version("0.1.0")
            .build(cluster, vec![deployment])
    }

    #[test]
    fn test_cluster_record_comes_first() {
        let document = sample();
        assert_eq!(document.content.len(), 2);
        assert_eq!(document.content[0].record_type, "cluster");
        assert_eq!(document.content[0].id, "mycluster");
    }

    #[test]
    fn test_envelope_fields() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["connectorId"], "Kubernetes");
        assert_eq!(json["connectorType"], "k8s-connector");
        assert_eq!(json["connectorVersion"], "1.0.0");
        assert_eq!(json["processingDirection"], "inbound");
        assert_eq!(json["lxVersion"], "1.0.0");
        assert_eq!(json["lxWorkspace"], "my-workspace");
        assert_eq!(json["customFields"]["connectorInstance"], "connector-1");
        assert_eq!(json["customFields"]["buildVersion"], "0.1.0");
        assert_eq!(json["content"][1]["data"]["isRedundant"], true);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let document = DocumentBuilder::new("")
            .description("")
            .build(OutputRecord::new("cluster", "c"), vec![]);
        let json = serde_json::to_value(document).unwrap();

        assert!(json.get("connectorVersion").is_none());
        assert!(json.get("lxWorkspace").is_none());
        assert!(json.get("description").is_none());
        assert!(json["customFields"].get("connectorInstance").is_none());
    }

    #[test]
    fn test_json_bytes_are_indented() {
        let bytes = sample().to_json_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"connectorId\""));

        let parsed: OutputDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.content.len(), 2);
    }
}
