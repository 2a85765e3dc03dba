use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, NodeKind, Severity};

use super::{found_nodes, is_found, name_of, AnalysisContext};

/// Finds routes sending traffic to services that do not exist.
pub fn find_missing_route_services(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for route in found_nodes(graph, NodeKind::Route) {
        for service in graph.successors_of_kind(route.id, EdgeKind::ExposedThroughRoute, NodeKind::Service) {
            if is_found(graph, service) {
                continue;
            }
            let service_name = name_of(graph, namer, service);
            markers.push(
                Marker::new(
                    route.id,
                    Severity::Warning,
                    MarkerKey::MissingRouteService,
                    format!(
                        "{} is supposed to route traffic to {}, but {} doesn't exist",
                        namer.resource_name(route),
                        service_name,
                        service_name
                    ),
                )
                .with_related([service]),
            );
        }
    }
    markers
}
