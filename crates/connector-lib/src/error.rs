//! Error types for the connector library

use thiserror::Error;

/// Result type alias for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Errors that can occur while building or persisting an inventory document.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("failed to list {resource}: {message}")]
    Retrieval { resource: String, message: String },

    #[error("node {node}: {resource} capacity {value:?} is not an exact integer quantity")]
    Quantity {
        node: String,
        resource: String,
        value: String,
    },

    #[error("invalid namespace pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("storage error ({target}): {message}")]
    Storage { target: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ConnectorError {
    /// Build a retrieval error for the given resource listing.
    pub fn retrieval(resource: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConnectorError::Retrieval {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Build a storage error for the given target.
    pub fn storage(target: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConnectorError::Storage {
            target: target.into(),
            message: message.to_string(),
        }
    }
}

impl From<kube::Error> for ConnectorError {
    fn from(err: kube::Error) -> Self {
        ConnectorError::Retrieval {
            resource: "cluster API".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_error_message() {
        let err = ConnectorError::Quantity {
            node: "nodepool-1".to_string(),
            resource: "cpu".to_string(),
            value: "1500m".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "node nodepool-1: cpu capacity \"1500m\" is not an exact integer quantity"
        );
    }

    #[test]
    fn test_retrieval_helper() {
        let err = ConnectorError::retrieval("nodes", "connection refused");
        assert_eq!(err.to_string(), "failed to list nodes: connection refused");
    }
}
