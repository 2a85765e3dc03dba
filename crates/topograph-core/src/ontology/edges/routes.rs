use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::ontology::nodes::find_or_create_synthetic_service_node;

/// Routes -> every backend service, primary and alternate, in the route's namespace.
pub fn add_all_route_edges(graph: &mut Graph) {
    for (route, service) in resolve_route_backends(graph) {
        graph.add_edge(route, service, EdgeKind::ExposedThroughRoute);
    }
}

/// `(route, service)` pairs, with placeholders ensured for missing services.
pub(crate) fn resolve_route_backends(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let mut refs: Vec<(NodeId, String, String)> = Vec::new();
    for node in graph.nodes_by_kind(NodeKind::Route) {
        let NodeObject::Route(route) = &node.object else {
            continue;
        };
        for service in route.backend_service_names() {
            refs.push((node.id, node.namespace().to_string(), service.to_string()));
        }
    }

    refs.into_iter()
        .map(|(route, namespace, name)| (route, find_or_create_synthetic_service_node(graph, &namespace, &name)))
        .collect()
}
