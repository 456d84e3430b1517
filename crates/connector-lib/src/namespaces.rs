//! Namespace blacklisting
//!
//! Blacklist patterns are glob-like: `*` matches any run of characters and
//! every other character is literal. Patterns are realized against the live
//! namespace list, and the resulting names are applied either as a
//! server-side field selector or as a client-side test.

use crate::error::{ConnectorError, Result};
use crate::set::StringSet;
use regex::Regex;
use tracing::debug;

const NAMESPACE_FIELD_PREFIX: &str = "metadata.namespace!=";

/// Compiled blacklist patterns
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    patterns: Vec<(String, Regex)>,
}

impl NamespaceFilter {
    /// Compile glob patterns. Surrounding commas are trimmed and empty
    /// patterns are skipped.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut compiled = Vec::new();

        for raw in patterns {
            let pattern = raw.as_ref().trim().trim_matches(',');
            if pattern.is_empty() {
                continue;
            }

            let regex = Regex::new(&glob_to_regex(pattern)).map_err(|source| {
                ConnectorError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            compiled.push((pattern.to_string(), regex));
        }

        Ok(Self { patterns: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `namespace` matches any pattern
    pub fn matches(&self, namespace: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(namespace))
    }

    /// The concrete set of namespace names to exclude
    pub fn realize<S: AsRef<str>>(&self, namespaces: &[S]) -> StringSet {
        let mut blacklist = StringSet::new();

        for (pattern, regex) in &self.patterns {
            for namespace in namespaces {
                let namespace = namespace.as_ref();
                if regex.is_match(namespace) {
                    debug!(pattern = %pattern, namespace = %namespace, "Namespace blacklisted");
                    blacklist.add(namespace);
                }
            }
        }

        blacklist
    }
}

/// Translate a glob into an anchored regular expression
fn glob_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{}$", body)
}

/// Build a field selector that excludes every blacklisted namespace, e.g.
/// `metadata.namespace!=kube-system,metadata.namespace!=private`.
pub fn blacklist_field_selector<S: AsRef<str>>(namespaces: &[S]) -> String {
    prefix(namespaces, NAMESPACE_FIELD_PREFIX).join(",")
}

/// Field selector for a realized blacklist, in stable order
pub fn field_selector_for(blacklist: &StringSet) -> String {
    blacklist_field_selector(&blacklist.sorted_items())
}

/// Client-side exclusion test for objects listed without a field selector.
/// Cluster-scoped objects (no namespace) are never excluded.
pub fn is_excluded(blacklist: &StringSet, namespace: Option<&str>) -> bool {
    match namespace {
        Some(ns) if !ns.is_empty() => blacklist.contains(ns),
        _ => false,
    }
}

/// Prefix every item with `p`
pub fn prefix<S: AsRef<str>>(items: &[S], p: &str) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{}{}", p, item.as_ref()))
        .collect()
}
