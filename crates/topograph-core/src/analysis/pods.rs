use crate::config::CRASH_LOOP_BACK_OFF_REASON;
use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, Node, NodeKind, Severity};
use crate::objects::ContainerStatus;

use super::{found_nodes, name_of, AnalysisContext};

/// What went wrong with one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finding {
    CrashLooping,
    Restarting,
}

fn classify(status: &ContainerStatus, ctx: &AnalysisContext) -> Option<Finding> {
    let last_finished = status.last_state.terminated.as_ref().and_then(|t| t.finished_at);
    // A termination record with no restart is the first run exiting.
    let restarted_recently = status.restart_count > 0 && last_finished.is_some_and(|at| ctx.is_recent(at));

    let waiting_reason = status.state.waiting.as_ref().map(|w| w.reason.as_str());
    if waiting_reason == Some(CRASH_LOOP_BACK_OFF_REASON) && restarted_recently {
        return Some(Finding::CrashLooping);
    }
    if restarted_recently || status.restart_count > ctx.config.restart_threshold {
        return Some(Finding::Restarting);
    }
    None
}

/// Finds pods with crash-looping or frequently restarting containers.
///
/// One affected container gets a marker naming it; several containers of the
/// same pod with the same finding share one pod-level marker.
pub fn find_restarting_pods(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for pod_node in found_nodes(graph, NodeKind::Pod) {
        let Some(pod) = pod_node.object.as_pod() else {
            continue;
        };

        let mut crashing: Vec<&ContainerStatus> = Vec::new();
        let mut restarting: Vec<&ContainerStatus> = Vec::new();
        for status in &pod.status.container_statuses {
            match classify(status, ctx) {
                Some(Finding::CrashLooping) => crashing.push(status),
                Some(Finding::Restarting) => restarting.push(status),
                None => {}
            }
        }

        if !crashing.is_empty() {
            markers.push(crash_loop_marker(pod_node, namer, ctx, &crashing));
        }
        if !restarting.is_empty() {
            markers.push(restart_marker(pod_node, namer, ctx, &restarting));
        }
    }
    markers
}

fn crash_loop_marker(pod: &Node, namer: &dyn Namer, ctx: &AnalysisContext, statuses: &[&ContainerStatus]) -> Marker {
    let pod_name = namer.resource_name(pod);
    let logs = &ctx.config.logs_command;
    match statuses {
        [single] => Marker::new(
            pod.id,
            Severity::Error,
            MarkerKey::CrashLoopingPod,
            format!("container \"{}\" in {} is crash-looping", single.name, pod_name),
        )
        .with_suggestion(format!(
            "The container is starting and exiting repeatedly. Check its logs with: {} -p {} -c {}",
            logs,
            pod.name(),
            single.name
        )),
        _ => Marker::new(
            pod.id,
            Severity::Error,
            MarkerKey::CrashLoopingPod,
            format!("{} containers in {} are crash-looping", statuses.len(), pod_name),
        )
        .with_suggestion(format!(
            "The containers are starting and exiting repeatedly. Check their logs with: {} -p {}",
            logs,
            pod.name()
        )),
    }
}

fn restart_marker(pod: &Node, namer: &dyn Namer, ctx: &AnalysisContext, statuses: &[&ContainerStatus]) -> Marker {
    let pod_name = namer.resource_name(pod);
    let logs = &ctx.config.logs_command;
    match statuses {
        [single] => Marker::new(
            pod.id,
            Severity::Warning,
            MarkerKey::RestartingPod,
            format!(
                "container \"{}\" in {} has restarted {} times",
                single.name, pod_name, single.restart_count
            ),
        )
        .with_suggestion(format!(
            "Restarts usually mean the container is failing. Check its logs with: {} -p {} -c {}",
            logs,
            pod.name(),
            single.name
        )),
        _ => {
            let total: i32 = statuses.iter().map(|s| s.restart_count).sum();
            Marker::new(
                pod.id,
                Severity::Warning,
                MarkerKey::RestartingPod,
                format!("{} containers in {} have restarted {} times", statuses.len(), pod_name, total),
            )
            .with_suggestion(format!(
                "Restarts usually mean the containers are failing. Check their logs with: {} -p {}",
                logs,
                pod.name()
            ))
        }
    }
}

/// Finds pods claimed by more than one controller.
pub fn find_dueling_replication_controllers(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for pod in found_nodes(graph, NodeKind::Pod) {
        let controllers = graph.successor_nodes_by_edge_kind(pod.id, EdgeKind::ManagedByController);
        if controllers.len() < 2 {
            continue;
        }
        let names: Vec<String> = controllers.iter().map(|&c| name_of(graph, namer, c)).collect();
        markers.push(
            Marker::new(
                pod.id,
                Severity::Warning,
                MarkerKey::DuelingReplicationControllers,
                format!("{} is being managed by multiple controllers: {}", namer.resource_name(pod), names.join(", ")),
            )
            .with_related(controllers)
            .with_suggestion("Change the selectors so that each pod matches only one controller."),
        );
    }
    markers
}
