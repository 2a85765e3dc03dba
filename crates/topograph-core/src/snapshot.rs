//! Decoding cluster snapshots into objects.
//!
//! A snapshot is a `List` document with an `items` array, a bare sequence of
//! objects, or a YAML stream of several such documents. Every object carries
//! a `kind` field. Items of kinds the graph does not model are skipped.

use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::builder::TopologyBuilder;
use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::objects::Object;

/// Kinds decoded into [`Object`]s.
pub const SUPPORTED_KINDS: &[&str] = &[
    "Pod",
    "ReplicationController",
    "ReplicaSet",
    "StatefulSet",
    "DaemonSet",
    "Deployment",
    "DeploymentConfig",
    "Service",
    "ServiceAccount",
    "Secret",
    "PersistentVolumeClaim",
    "HorizontalPodAutoscaler",
    "Route",
    "Build",
    "BuildConfig",
    "ImageStream",
    "ImageStreamTag",
];

/// Decoded objects of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub objects: Vec<Object>,
    /// Items skipped because their kind is unsupported or they did not decode.
    pub skipped: usize,
}

impl Snapshot {
    /// Decodes a JSON snapshot.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;
        let mut snapshot = Self::default();
        snapshot.collect(document)?;
        Ok(snapshot)
    }

    /// Decodes a YAML snapshot, which may hold several documents.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut snapshot = Self::default();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = Value::deserialize(document)?;
            snapshot.collect(value)?;
        }
        Ok(snapshot)
    }

    /// Reads a snapshot file, choosing the decoder by extension.
    ///
    /// `.json` files are decoded as JSON; anything else as YAML, which also
    /// accepts JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TopologyError::io(path, e))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        debug!(
            "Loaded {} objects from {} ({} skipped)",
            snapshot.objects.len(),
            path.display(),
            snapshot.skipped
        );
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Loads every object into a builder and returns the finished graph.
    pub fn build_graph(&self) -> Graph {
        let mut builder = TopologyBuilder::new();
        let rejected = builder.add_objects(&self.objects);
        if rejected > 0 {
            warn!("{} snapshot objects could not be identified", rejected);
        }
        builder.build()
    }

    fn collect(&mut self, document: Value) -> Result<()> {
        match document {
            Value::Null => Ok(()),
            Value::Array(items) => {
                for item in items {
                    self.push_item(item);
                }
                Ok(())
            }
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => {
                    for item in items {
                        self.push_item(item);
                    }
                    Ok(())
                }
                Some(Value::Null) => Ok(()),
                Some(_) => Err(TopologyError::InvalidSnapshot("`items` is not a list".to_string())),
                None => {
                    self.push_item(Value::Object(map));
                    Ok(())
                }
            },
            other => Err(TopologyError::InvalidSnapshot(format!(
                "expected a list of objects, found {}",
                value_type(&other)
            ))),
        }
    }

    fn push_item(&mut self, item: Value) {
        let kind = item.get("kind").and_then(Value::as_str).unwrap_or_default().to_string();
        if !SUPPORTED_KINDS.contains(&kind.as_str()) {
            warn!("Skipping object of unsupported kind {:?}", kind);
            self.skipped += 1;
            return;
        }
        match serde_json::from_value::<Object>(item) {
            Ok(object) => self.objects.push(object),
            Err(e) => {
                warn!("Skipping malformed {}: {}", kind, e);
                self.skipped += 1;
            }
        }
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_YAML: &str = r#"
apiVersion: v1
kind: List
items:
  - apiVersion: v1
    kind: Service
    metadata:
      name: web
      namespace: shop
    spec:
      selector:
        app: web
  - apiVersion: v1
    kind: ConfigMap
    metadata:
      name: settings
      namespace: shop
"#;

    #[test]
    fn test_yaml_list_skips_unsupported_kinds() {
        let snapshot = Snapshot::from_yaml_str(LIST_YAML).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.objects[0].kind(), "Service");
    }

    #[test]
    fn test_json_bare_sequence() {
        let json = r#"[
            {"kind": "Secret", "metadata": {"name": "creds", "namespace": "shop"}},
            {"kind": "ServiceAccount", "metadata": {"name": "default", "namespace": "shop"}}
        ]"#;
        let snapshot = Snapshot::from_json_str(json).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.skipped, 0);
    }

    #[test]
    fn test_yaml_multi_document() {
        let yaml = "kind: Secret\nmetadata:\n  name: a\n  namespace: ns\n---\nkind: Secret\nmetadata:\n  name: b\n  namespace: ns\n";
        let snapshot = Snapshot::from_yaml_str(yaml).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_scalar_document_rejected() {
        let err = Snapshot::from_json_str("42").unwrap_err();
        assert!(matches!(err, TopologyError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = Snapshot::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, TopologyError::Json(_)));
    }
}
