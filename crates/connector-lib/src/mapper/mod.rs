//! Mapping of cluster objects into uniform output records
//!
//! Every record carries a `type`, an `id` and a flat `data` mapping whose
//! values come from a small closed set of kinds.

mod cluster;
mod resources;
mod workloads;

pub use cluster::{map_cluster, CLUSTER_RECORD_TYPE};
pub use resources::map_resource;
pub use workloads::{map_workload, map_workloads};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters the downstream catalog rejects in field names
const RESERVED_KEY_CHARS: [char; 6] = ['/', '.', '+', '-', '*', '\\'];

/// A value inside a record's `data` mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    String(String),
    StringList(Vec<String>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    LabelSets(BTreeMap<String, Vec<String>>),
}

impl From<String> for OutputValue {
    fn from(value: String) -> Self {
        OutputValue::String(value)
    }
}

impl From<&str> for OutputValue {
    fn from(value: &str) -> Self {
        OutputValue::String(value.to_string())
    }
}

impl From<Vec<String>> for OutputValue {
    fn from(value: Vec<String>) -> Self {
        OutputValue::StringList(value)
    }
}

impl From<i64> for OutputValue {
    fn from(value: i64) -> Self {
        OutputValue::Integer(value)
    }
}

impl From<f64> for OutputValue {
    fn from(value: f64) -> Self {
        OutputValue::Float(value)
    }
}

impl From<bool> for OutputValue {
    fn from(value: bool) -> Self {
        OutputValue::Boolean(value)
    }
}

impl From<BTreeMap<String, Vec<String>>> for OutputValue {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        OutputValue::LabelSets(value)
    }
}

/// One entry of the output document's `content`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub id: String,
    pub data: BTreeMap<String, OutputValue>,
}

impl OutputRecord {
    pub fn new(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            id: id.into(),
            data: BTreeMap::new(),
        }
    }

    /// Set a data field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OutputValue>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OutputValue> {
        self.data.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.data.get(key) {
            Some(OutputValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Copy labels into the data mapping under sanitized keys
    pub fn insert_labels(&mut self, labels: &BTreeMap<String, String>) {
        for (key, value) in labels {
            self.insert(sanitize_label_key(key), value.as_str());
        }
    }
}

/// Replace every character the catalog rejects in field names with `_`.
/// Values are never passed through this.
pub fn sanitize_label_key(key: &str) -> String {
    key.chars()
        .map(|c| if RESERVED_KEY_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
