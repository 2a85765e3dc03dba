//! Service exposure by label selector.

use std::collections::BTreeMap;

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::selector_matches;

/// `(service, namespace, selector)` for every service with a non-empty selector.
fn selecting_services(graph: &Graph) -> Vec<(NodeId, String, BTreeMap<String, String>)> {
    graph
        .nodes_by_kind(NodeKind::Service)
        .into_iter()
        .filter_map(|node| {
            let service = node.object.as_service()?;
            if service.spec.selector.is_empty() {
                return None;
            }
            Some((node.id, node.namespace().to_string(), service.spec.selector.clone()))
        })
        .collect()
}

fn add_exposure_edges<F>(graph: &mut Graph, kind: NodeKind, labels_of: F)
where
    F: Fn(&NodeObject) -> Option<&BTreeMap<String, String>>,
{
    let services = selecting_services(graph);
    let mut edges = Vec::new();
    for node in graph.nodes_by_kind(kind) {
        let Some(labels) = labels_of(&node.object) else {
            continue;
        };
        for (service, namespace, selector) in &services {
            if namespace == node.namespace() && selector_matches(selector, labels) {
                edges.push((node.id, *service));
            }
        }
    }
    for (from, to) in edges {
        graph.add_edge(from, to, EdgeKind::ExposedThroughService);
    }
}

/// Pod templates whose labels match a service selector in their namespace.
pub fn add_all_exposed_pod_template_spec_edges(graph: &mut Graph) {
    add_exposure_edges(graph, NodeKind::PodTemplateSpec, |object| match object {
        NodeObject::PodTemplateSpec(part) => Some(&part.spec.metadata.labels),
        _ => None,
    });
}

/// Pods whose labels match a service selector in their namespace.
pub fn add_all_exposed_pod_edges(graph: &mut Graph) {
    add_exposure_edges(graph, NodeKind::Pod, |object| {
        object.as_pod().map(|pod| &pod.metadata.labels)
    });
}
