use crate::graph::{Graph, Marker, MarkerKey, Namer, Severity};

use super::{top_level_controllers, AnalysisContext};

/// Finds top-level controllers whose pods never report readiness.
pub fn find_missing_readiness_probes(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for controller in top_level_controllers(graph) {
        let Some(spec) = controller.object.pod_spec() else {
            continue;
        };
        if spec.containers.is_empty() || spec.has_readiness_probe() {
            continue;
        }
        let name = namer.resource_name(controller);
        markers.push(
            Marker::new(
                controller.id,
                Severity::Warning,
                MarkerKey::MissingReadinessProbe,
                format!("{name} has no readiness probe to verify pods are ready to accept traffic or ensure deployment is successful."),
            )
            .with_suggestion(format!("{} {} --readiness ...", ctx.config.set_probe_command, name)),
        );
    }
    markers
}

/// Finds top-level controllers whose pods are never checked for liveness.
pub fn find_missing_liveness_probes(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for controller in top_level_controllers(graph) {
        let Some(spec) = controller.object.pod_spec() else {
            continue;
        };
        if spec.containers.is_empty() || spec.has_liveness_probe() {
            continue;
        }
        let name = namer.resource_name(controller);
        markers.push(
            Marker::new(
                controller.id,
                Severity::Info,
                MarkerKey::MissingLivenessProbe,
                format!("{name} has no liveness probe to verify pods are still running."),
            )
            .with_suggestion(format!("{} {} --liveness ...", ctx.config.set_probe_command, name)),
        );
    }
    markers
}
