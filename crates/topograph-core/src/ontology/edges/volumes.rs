use crate::graph::{EdgeKind, Graph, NodeId};
use crate::ontology::nodes::find_or_create_synthetic_pvc_node;

use super::controller_ids;

/// Controllers -> the volume claims their pod template mounts.
pub fn add_all_volume_claim_edges(graph: &mut Graph) {
    for (controller, claim) in resolve_volume_claims(graph) {
        graph.add_edge(controller, claim, EdgeKind::VolumeClaim);
    }
}

/// `(controller, claim)` pairs, with placeholders ensured for missing claims.
pub(crate) fn resolve_volume_claims(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let mut refs: Vec<(NodeId, String, String)> = Vec::new();
    for id in controller_ids(graph) {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let Some(spec) = node.object.pod_spec() else {
            continue;
        };
        for claim in spec.claim_names() {
            refs.push((id, node.namespace().to_string(), claim.to_string()));
        }
    }

    refs.into_iter()
        .map(|(controller, namespace, name)| (controller, find_or_create_synthetic_pvc_node(graph, &namespace, &name)))
        .collect()
}
