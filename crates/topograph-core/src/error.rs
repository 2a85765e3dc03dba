//! Topology error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a topology from objects or snapshots.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The object lacks the fields that identify it.
    #[error("Cannot identify {kind}: {reason}")]
    UnidentifiableObject { kind: String, reason: String },

    /// Snapshot item or document that is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot document that is not valid YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Snapshot document of an unexpected shape.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TopologyError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TopologyError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for TopologyError {
    fn from(err: std::io::Error) -> Self {
        TopologyError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Result alias for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;
