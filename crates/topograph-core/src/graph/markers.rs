//! Diagnostic markers attached to graph nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// How serious a finding is. Orders `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Stable identifier of the rule outcome a marker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerKey {
    // === Images ===
    MissingImageStreamTag,
    MissingImageStream,

    // === Probes ===
    MissingReadinessProbe,
    MissingLivenessProbe,

    // === Pods ===
    CrashLoopingPod,
    RestartingPod,
    DuelingReplicationControllers,

    // === Volumes and secrets ===
    SingleHostVolume,
    MissingPersistentVolumeClaim,
    MissingSecret,
    UnmountableSecret,

    // === Autoscaling ===
    #[serde(rename = "HPAMissingScaleRef")]
    HpaMissingScaleRef,
    #[serde(rename = "HPAMissingCPUTarget")]
    HpaMissingCpuTarget,
    #[serde(rename = "HPAOverlappingScaleRef")]
    HpaOverlappingScaleRef,

    // === Routes ===
    MissingRouteService,

    // === Builds ===
    MissingOutputImageStream,
    CyclicBuildConfig,
    LatestBuildFailed,
}

impl MarkerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingImageStreamTag => "MissingImageStreamTag",
            Self::MissingImageStream => "MissingImageStream",
            Self::MissingReadinessProbe => "MissingReadinessProbe",
            Self::MissingLivenessProbe => "MissingLivenessProbe",
            Self::CrashLoopingPod => "CrashLoopingPod",
            Self::RestartingPod => "RestartingPod",
            Self::DuelingReplicationControllers => "DuelingReplicationControllers",
            Self::SingleHostVolume => "SingleHostVolume",
            Self::MissingPersistentVolumeClaim => "MissingPersistentVolumeClaim",
            Self::MissingSecret => "MissingSecret",
            Self::UnmountableSecret => "UnmountableSecret",
            Self::HpaMissingScaleRef => "HPAMissingScaleRef",
            Self::HpaMissingCpuTarget => "HPAMissingCPUTarget",
            Self::HpaOverlappingScaleRef => "HPAOverlappingScaleRef",
            Self::MissingRouteService => "MissingRouteService",
            Self::MissingOutputImageStream => "MissingOutputImageStream",
            Self::CyclicBuildConfig => "CyclicBuildConfig",
            Self::LatestBuildFailed => "LatestBuildFailed",
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding about one node of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub node: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_nodes: Vec<NodeId>,
    pub severity: Severity,
    pub key: MarkerKey,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Marker {
    pub fn new(node: NodeId, severity: Severity, key: MarkerKey, message: impl Into<String>) -> Self {
        Self {
            node,
            related_nodes: Vec::new(),
            severity,
            key,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_related(mut self, related: impl IntoIterator<Item = NodeId>) -> Self {
        self.related_nodes.extend(related);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.key, self.message)
    }
}

/// An ordered collection of markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markers(pub Vec<Marker>);

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.0.iter()
    }

    /// Markers with exactly the given severity.
    pub fn by_severity(&self, severity: Severity) -> Vec<&Marker> {
        self.0.iter().filter(|m| m.severity == severity).collect()
    }

    pub fn by_key(&self, key: MarkerKey) -> Vec<&Marker> {
        self.0.iter().filter(|m| m.key == key).collect()
    }

    pub fn sort_by_key(&mut self) {
        self.0.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn sort_by_node_id(&mut self) {
        self.0.sort_by_key(|m| m.node);
    }

    /// Errors first, then warnings, then info; ties broken by key, node
    /// and message so the order is fully deterministic.
    pub fn sort_by_severity(&mut self) {
        self.0.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.key.cmp(&b.key))
                .then(a.node.cmp(&b.node))
                .then_with(|| a.message.cmp(&b.message))
        });
    }
}

impl From<Vec<Marker>> for Markers {
    fn from(markers: Vec<Marker>) -> Self {
        Self(markers)
    }
}

impl Extend<Marker> for Markers {
    fn extend<I: IntoIterator<Item = Marker>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Markers {
    type Item = Marker;
    type IntoIter = std::vec::IntoIter<Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Markers {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_errors_sort_first() {
        let mut markers = Markers::from(vec![
            Marker::new(NodeId(3), Severity::Info, MarkerKey::MissingLivenessProbe, "a"),
            Marker::new(NodeId(1), Severity::Error, MarkerKey::CrashLoopingPod, "b"),
            Marker::new(NodeId(2), Severity::Warning, MarkerKey::RestartingPod, "c"),
        ]);
        markers.sort_by_severity();
        let severities: Vec<Severity> = markers.iter().map(|m| m.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning, Severity::Info]);

        markers.sort_by_node_id();
        assert_eq!(markers.0[0].node, NodeId(1));
        assert_eq!(markers.by_severity(Severity::Warning).len(), 1);
    }

    #[test]
    fn test_key_strings_match_serde() {
        let json = serde_json::to_string(&MarkerKey::HpaMissingCpuTarget).unwrap();
        assert_eq!(json, format!("\"{}\"", MarkerKey::HpaMissingCpuTarget.as_str()));
    }
}
