use std::collections::BTreeSet;

use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, NodeId, NodeKind, Severity};

use super::{found_nodes, is_found, name_of, AnalysisContext};

/// CPU target suggested when an autoscaler has none.
const SUGGESTED_CPU_PERCENT: i32 = 80;

/// The node an autoscaler scales, if its reference resolved.
fn scale_target(graph: &Graph, hpa: NodeId) -> Option<NodeId> {
    graph.successor_nodes_by_edge_kind(hpa, EdgeKind::Scaling).first().copied()
}

/// Finds autoscalers whose scale target is unresolvable or does not exist.
pub fn find_hpa_missing_scale_refs(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for hpa in found_nodes(graph, NodeKind::HorizontalPodAutoscaler) {
        let hpa_name = namer.resource_name(hpa);
        match scale_target(graph, hpa.id) {
            None => markers.push(Marker::new(
                hpa.id,
                Severity::Error,
                MarkerKey::HpaMissingScaleRef,
                format!("{hpa_name} is attempting to scale a resource that cannot be resolved"),
            )),
            Some(target) if !is_found(graph, target) => markers.push(
                Marker::new(
                    hpa.id,
                    Severity::Error,
                    MarkerKey::HpaMissingScaleRef,
                    format!(
                        "{} is attempting to scale {}, which doesn't exist",
                        hpa_name,
                        name_of(graph, namer, target)
                    ),
                )
                .with_related([target]),
            ),
            Some(_) => {}
        }
    }
    markers
}

/// Finds autoscalers without a CPU utilization target.
pub fn find_hpa_missing_cpu_targets(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for hpa in found_nodes(graph, NodeKind::HorizontalPodAutoscaler) {
        let Some(spec) = hpa.object.as_hpa().map(|h| &h.spec) else {
            continue;
        };
        if spec.target_cpu_utilization_percentage.is_some() {
            continue;
        }
        let mut marker = Marker::new(
            hpa.id,
            Severity::Error,
            MarkerKey::HpaMissingCpuTarget,
            format!("{} is missing a CPU utilization target", namer.resource_name(hpa)),
        );
        if let Some(target) = scale_target(graph, hpa.id) {
            marker = marker.with_suggestion(format!(
                "{} {} --cpu-percent={} --max={}",
                ctx.config.autoscale_command,
                name_of(graph, namer, target),
                SUGGESTED_CPU_PERCENT,
                spec.max_replicas
            ));
        }
        markers.push(marker);
    }
    markers
}

/// The target plus the controllers whose replica count moves with it: the
/// replicas of a deployment controller, or the manager of a replica.
fn scale_scope(graph: &Graph, target: NodeId) -> BTreeSet<NodeId> {
    let mut scope = BTreeSet::from([target]);
    scope.extend(graph.successor_nodes_by_edge_kind(target, EdgeKind::Deployment));
    for manager in [NodeKind::DeploymentConfig, NodeKind::Deployment] {
        scope.extend(graph.successors_of_kind(target, EdgeKind::ManagedByController, manager));
    }
    scope
}

/// Finds autoscalers that fight over the same replica count.
pub fn find_overlapping_hpas(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let scalers: Vec<(NodeId, NodeId)> = found_nodes(graph, NodeKind::HorizontalPodAutoscaler)
        .filter_map(|hpa| Some((hpa.id, scale_target(graph, hpa.id)?)))
        .collect();

    let mut markers = Vec::new();
    for &(hpa, target) in &scalers {
        let scope = scale_scope(graph, target);
        let overlapping: Vec<NodeId> = scalers
            .iter()
            .filter(|&&(other, other_target)| other != hpa && scope.contains(&other_target))
            .map(|&(other, _)| other)
            .collect();
        if overlapping.is_empty() {
            continue;
        }
        let names: Vec<String> = overlapping.iter().map(|&o| name_of(graph, namer, o)).collect();
        markers.push(
            Marker::new(
                hpa,
                Severity::Warning,
                MarkerKey::HpaOverlappingScaleRef,
                format!(
                    "{} scales {} and overlaps with {}",
                    name_of(graph, namer, hpa),
                    name_of(graph, namer, target),
                    names.join(", ")
                ),
            )
            .with_related(overlapping)
            .with_suggestion("Keep a single autoscaler per workload."),
        );
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, namer};
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::objects::{CrossVersionObjectReference, DeploymentConfig, HorizontalPodAutoscaler, ObjectMeta};

    fn hpa(name: &str, kind: &str, target: &str, cpu: Option<i32>) -> HorizontalPodAutoscaler {
        let mut hpa = HorizontalPodAutoscaler {
            metadata: ObjectMeta::named("ns", name),
            ..HorizontalPodAutoscaler::default()
        };
        hpa.spec.scale_target_ref = CrossVersionObjectReference {
            kind: kind.to_string(),
            name: target.to_string(),
            api_version: "apps.openshift.io/v1".to_string(),
        };
        hpa.spec.max_replicas = 5;
        hpa.spec.target_cpu_utilization_percentage = cpu;
        hpa
    }

    fn web_dc() -> DeploymentConfig {
        DeploymentConfig {
            metadata: ObjectMeta::named("ns", "web"),
            ..DeploymentConfig::default()
        }
    }

    #[test]
    fn test_missing_scale_target() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_horizontal_pod_autoscaler(&hpa("web", "DeploymentConfig", "web", Some(70)))
            .unwrap();
        builder
            .add_horizontal_pod_autoscaler(&hpa("odd", "Widget", "web", Some(70)))
            .unwrap();
        let graph = builder.build();

        let markers = find_hpa_missing_scale_refs(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.severity == Severity::Error));
        assert_eq!(markers[0].message, "hpa/web is attempting to scale dc/web, which doesn't exist");
    }

    #[test]
    fn test_missing_cpu_target_suggestion() {
        let mut builder = TopologyBuilder::new();
        builder.add_deployment_config(&web_dc()).unwrap();
        builder
            .add_horizontal_pod_autoscaler(&hpa("web", "DeploymentConfig", "web", None))
            .unwrap();
        let graph = builder.build();

        let markers = find_hpa_missing_cpu_targets(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(
            markers[0].suggestion.as_deref(),
            Some("oc autoscale dc/web --cpu-percent=80 --max=5")
        );
        assert!(find_hpa_missing_scale_refs(&graph, &namer(), &ctx()).is_empty());
    }

    #[test]
    fn test_overlapping_autoscalers() {
        let mut builder = TopologyBuilder::new();
        builder.add_deployment_config(&web_dc()).unwrap();
        builder
            .add_horizontal_pod_autoscaler(&hpa("one", "DeploymentConfig", "web", Some(70)))
            .unwrap();
        builder
            .add_horizontal_pod_autoscaler(&hpa("two", "DeploymentConfig", "web", Some(70)))
            .unwrap();
        let graph = builder.build();

        let markers = find_overlapping_hpas(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].key, MarkerKey::HpaOverlappingScaleRef);
    }
}
