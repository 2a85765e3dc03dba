//! Autoscalers and their scale targets.

use log::debug;

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind};
use crate::objects::CrossVersionObjectReference;
use crate::ontology::nodes::find_or_create_synthetic_controller_node;

/// Scalable resources: `(group, plural resource, node kind)`.
const SCALABLE_RESOURCES: &[(&str, &str, NodeKind)] = &[
    ("", "replicationcontrollers", NodeKind::ReplicationController),
    ("", "deploymentconfigs", NodeKind::DeploymentConfig),
    ("apps.openshift.io", "deploymentconfigs", NodeKind::DeploymentConfig),
    ("apps", "deployments", NodeKind::Deployment),
    ("extensions", "deployments", NodeKind::Deployment),
    ("apps", "replicasets", NodeKind::ReplicaSet),
    ("extensions", "replicasets", NodeKind::ReplicaSet),
    ("apps", "statefulsets", NodeKind::StatefulSet),
];

/// Maps a scale target reference to the kind of node it names.
///
/// The group comes from `apiVersion` (`group/version`, or just `version` for
/// the core group) and the resource is the lowercased, pluralized kind.
pub fn resolve_scale_target(target: &CrossVersionObjectReference) -> Option<NodeKind> {
    let group = match target.api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    };
    let resource = format!("{}s", target.kind.to_lowercase());
    SCALABLE_RESOURCES
        .iter()
        .find(|(g, r, _)| *g == group && *r == resource)
        .map(|(_, _, kind)| *kind)
}

/// Links every autoscaler to its scale target, creating a placeholder when
/// the target was not loaded. Unresolvable targets are skipped.
pub fn add_all_scaling_edges(graph: &mut Graph) {
    for (hpa, target) in resolve_scale_targets(graph) {
        graph.add_edge(hpa, target, EdgeKind::Scaling);
    }
}

/// `(autoscaler, target)` pairs, with placeholders ensured for missing targets.
pub(crate) fn resolve_scale_targets(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let targets: Vec<(NodeId, String, CrossVersionObjectReference)> = graph
        .nodes_by_kind(NodeKind::HorizontalPodAutoscaler)
        .into_iter()
        .filter_map(|node| {
            let hpa = node.object.as_hpa()?;
            Some((node.id, node.namespace().to_string(), hpa.spec.scale_target_ref.clone()))
        })
        .collect();

    let mut pairs = Vec::new();
    for (hpa, namespace, target) in targets {
        if target.name.is_empty() {
            continue;
        }
        let Some(kind) = resolve_scale_target(&target) else {
            debug!(
                "Skipping unresolvable scale target {}/{} ({})",
                target.kind, target.name, target.api_version
            );
            continue;
        };
        if let Some(id) = find_or_create_synthetic_controller_node(graph, kind, &namespace, &target.name) {
            pairs.push((hpa, id));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: &str, api_version: &str) -> CrossVersionObjectReference {
        CrossVersionObjectReference {
            kind: kind.into(),
            name: "web".into(),
            api_version: api_version.into(),
        }
    }

    #[test]
    fn test_resolve_scale_target() {
        assert_eq!(
            resolve_scale_target(&target("ReplicationController", "v1")),
            Some(NodeKind::ReplicationController)
        );
        assert_eq!(
            resolve_scale_target(&target("DeploymentConfig", "apps.openshift.io/v1")),
            Some(NodeKind::DeploymentConfig)
        );
        assert_eq!(
            resolve_scale_target(&target("Deployment", "apps/v1")),
            Some(NodeKind::Deployment)
        );
        assert_eq!(
            resolve_scale_target(&target("Deployment", "extensions/v1beta1")),
            Some(NodeKind::Deployment)
        );
        assert_eq!(resolve_scale_target(&target("Deployment", "v1")), None);
        assert_eq!(resolve_scale_target(&target("Widget", "example.com/v1")), None);
    }
}
