//! Pods managed by replica controllers.

use std::collections::BTreeMap;

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::{selector_matches, LabelSelector};

enum Selector<'a> {
    Map(&'a BTreeMap<String, String>),
    Structured(&'a LabelSelector),
}

impl Selector<'_> {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Selector::Map(map) => selector_matches(map, labels),
            Selector::Structured(selector) => selector.matches(labels),
        }
    }
}

fn pod_selector(object: &NodeObject) -> Option<Selector<'_>> {
    let selector = match object {
        NodeObject::ReplicationController(rc) => Selector::Map(&rc.spec.selector),
        NodeObject::ReplicaSet(rs) => Selector::Structured(rs.spec.selector.as_ref()?),
        NodeObject::StatefulSet(set) => Selector::Structured(set.spec.selector.as_ref()?),
        NodeObject::DaemonSet(set) => Selector::Structured(set.spec.selector.as_ref()?),
        _ => return None,
    };
    Some(selector)
}

/// Links every pod to each replica controller in its namespace whose
/// selector matches the pod's labels.
///
/// Controllers with an empty or absent selector manage nothing.
pub fn add_all_managed_by_controller_pod_edges(graph: &mut Graph) {
    for (pod, controller) in managed_pod_pairs(graph) {
        graph.add_edge(pod, controller, EdgeKind::ManagedByController);
    }
}

fn managed_pod_pairs(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let pods = graph.nodes_by_kind(NodeKind::Pod);
    let mut edges = Vec::new();

    for kind in [
        NodeKind::ReplicationController,
        NodeKind::ReplicaSet,
        NodeKind::StatefulSet,
        NodeKind::DaemonSet,
    ] {
        for controller in graph.nodes_by_kind(kind) {
            let Some(selector) = pod_selector(&controller.object) else {
                continue;
            };
            for pod in &pods {
                let Some(p) = pod.object.as_pod() else {
                    continue;
                };
                if pod.namespace() == controller.namespace() && selector.matches(&p.metadata.labels) {
                    edges.push((pod.id, controller.id));
                }
            }
        }
    }
    edges
}
