//! Object metadata shared by every orchestration kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard object metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    /// Object name, unique within its namespace and kind.
    pub name: String,

    /// Namespace the object lives in. Empty for cluster-scoped objects.
    pub namespace: String,

    /// Server-assigned unique identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Metadata carrying only a namespace and a name.
    ///
    /// Used for synthetic placeholder objects.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels = labels.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// The owner reference marked as the managing controller, if any.
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references
            .iter()
            .find(|r| r.controller.unwrap_or(false))
    }

    /// Whether this object is controlled by the object of `kind` described by `owner`.
    ///
    /// UIDs are compared when both sides carry one; otherwise kind and name decide.
    pub fn is_controlled_by(&self, kind: &str, owner: &ObjectMeta) -> bool {
        let Some(controller) = self.controller_ref() else {
            return false;
        };
        if controller.kind != kind || controller.name != owner.name {
            return false;
        }
        match (&controller.uid, &owner.uid) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => a == b,
            _ => true,
        }
    }
}

/// Reference from a dependent object to its owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
}

impl OwnerReference {
    /// A controlling owner reference.
    pub fn controller(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            controller: Some(true),
            ..Self::default()
        }
    }
}

/// Reference to another object by kind, namespace and name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectReference {
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
}

impl ObjectReference {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The referenced namespace, defaulting to `fallback` when unset.
    pub fn namespace_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.namespace.is_empty() {
            fallback
        } else {
            &self.namespace
        }
    }
}

/// Reference to an object by name within the referrer's namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalObjectReference {
    pub name: String,
}

/// A value that is either an integer or a string such as `"25%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    String(String),
}

impl IntOrString {
    /// Whether the value is strictly positive.
    ///
    /// Percentages are positive when their numeric part is; unparsable strings are not.
    pub fn is_positive(&self) -> bool {
        match self {
            IntOrString::Int(n) => *n > 0,
            IntOrString::String(s) => s
                .trim_end_matches('%')
                .parse::<i64>()
                .map(|n| n > 0)
                .unwrap_or(false),
        }
    }
}

// =============================================================================
// LABEL SELECTORS
// =============================================================================

/// Structured label selector used by replica sets, stateful sets, daemon sets
/// and deployments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSelector {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl LabelSelector {
    pub fn from_labels<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            match_labels: labels.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            match_expressions: Vec::new(),
        }
    }

    /// A selector with no requirements. Such selectors never select anything here.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        if self.is_empty() {
            return false;
        }
        selector_matches(&self.match_labels, labels)
            && self.match_expressions.iter().all(|req| req.matches(labels))
    }
}

impl LabelSelectorRequirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            SelectorOperator::In => value.is_some_and(|v| self.values.contains(v)),
            SelectorOperator::NotIn => value.map_or(true, |v| !self.values.contains(v)),
            SelectorOperator::Exists => value.is_some(),
            SelectorOperator::DoesNotExist => value.is_none(),
        }
    }
}

/// Equality-based selector match: every selector pair must be present in `labels`.
///
/// An empty selector matches nothing.
pub fn selector_matches(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        assert!(!selector_matches(&BTreeMap::new(), &labels(&[("app", "web")])));
        assert!(!LabelSelector::default().matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_map_selector_subset() {
        let selector = labels(&[("app", "web")]);
        assert!(selector_matches(&selector, &labels(&[("app", "web"), ("tier", "fe")])));
        assert!(!selector_matches(&selector, &labels(&[("app", "db")])));
    }

    #[test]
    fn test_match_expressions() {
        let selector = LabelSelector {
            match_labels: BTreeMap::new(),
            match_expressions: vec![
                LabelSelectorRequirement {
                    key: "tier".into(),
                    operator: SelectorOperator::In,
                    values: vec!["fe".into(), "be".into()],
                },
                LabelSelectorRequirement {
                    key: "canary".into(),
                    operator: SelectorOperator::DoesNotExist,
                    values: vec![],
                },
            ],
        };
        assert!(selector.matches(&labels(&[("tier", "fe")])));
        assert!(!selector.matches(&labels(&[("tier", "fe"), ("canary", "1")])));
        assert!(!selector.matches(&labels(&[("tier", "db")])));
    }

    #[test]
    fn test_int_or_string_positive() {
        assert!(IntOrString::Int(1).is_positive());
        assert!(!IntOrString::Int(0).is_positive());
        assert!(IntOrString::String("25%".into()).is_positive());
        assert!(!IntOrString::String("0%".into()).is_positive());
    }

    #[test]
    fn test_is_controlled_by() {
        let owner = ObjectMeta::named("ns", "frontend");
        let mut child = ObjectMeta::named("ns", "frontend-1");
        assert!(!child.is_controlled_by("Deployment", &owner));

        child.owner_references.push(OwnerReference::controller("Deployment", "frontend"));
        assert!(child.is_controlled_by("Deployment", &owner));
        assert!(!child.is_controlled_by("DeploymentConfig", &owner));
    }
}
