//! Views rooted at controllers that manage pods directly.

use serde::Serialize;

use super::{workload_closure, CoveredSet};
use crate::graph::{EdgeKind, Graph, NodeId, NodeKind};

/// Pods managed by `controller`, ascending.
fn owned_pods(graph: &Graph, controller: NodeId) -> Vec<NodeId> {
    graph.predecessors_of_kind(controller, EdgeKind::ManagedByController, NodeKind::Pod)
}

fn cover_pods(graph: &Graph, covered: &mut CoveredSet, pods: &[NodeId]) {
    for &pod in pods {
        covered.extend(workload_closure(graph, pod));
    }
}

/// A ReplicationController or ReplicaSet with the pods it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaView {
    pub controller: NodeId,
    pub owned_pods: Vec<NodeId>,
    /// Other replica controllers selecting any of the owned pods.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicting: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scaled_by: Vec<NodeId>,
    pub claimed: CoveredSet,
}

impl ReplicaView {
    pub fn new(graph: &Graph, controller: NodeId) -> (Self, CoveredSet) {
        let mut covered = workload_closure(graph, controller);
        let owned_pods = owned_pods(graph, controller);
        cover_pods(graph, &mut covered, &owned_pods);

        let mut conflicting: Vec<NodeId> = owned_pods
            .iter()
            .flat_map(|&pod| graph.successor_nodes_by_edge_kind(pod, EdgeKind::ManagedByController))
            .filter(|&other| other != controller)
            .collect();
        conflicting.sort();
        conflicting.dedup();

        let scaled_by = graph.predecessor_nodes_by_edge_kind(controller, EdgeKind::Scaling);
        covered.extend(scaled_by.iter().copied());

        let view = Self {
            controller,
            owned_pods,
            conflicting,
            scaled_by,
            claimed: CoveredSet::new(),
        };
        (view, covered)
    }
}

/// A StatefulSet with its pods.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSetView {
    pub stateful_set: NodeId,
    pub owned_pods: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scaled_by: Vec<NodeId>,
    pub claimed: CoveredSet,
}

impl StatefulSetView {
    pub fn new(graph: &Graph, stateful_set: NodeId) -> (Self, CoveredSet) {
        let mut covered = workload_closure(graph, stateful_set);
        let owned_pods = owned_pods(graph, stateful_set);
        cover_pods(graph, &mut covered, &owned_pods);
        let scaled_by = graph.predecessor_nodes_by_edge_kind(stateful_set, EdgeKind::Scaling);
        covered.extend(scaled_by.iter().copied());

        let view = Self {
            stateful_set,
            owned_pods,
            scaled_by,
            claimed: CoveredSet::new(),
        };
        (view, covered)
    }
}

/// A DaemonSet with its pods.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSetView {
    pub daemon_set: NodeId,
    pub owned_pods: Vec<NodeId>,
    pub claimed: CoveredSet,
}

impl DaemonSetView {
    pub fn new(graph: &Graph, daemon_set: NodeId) -> (Self, CoveredSet) {
        let mut covered = workload_closure(graph, daemon_set);
        let owned_pods = owned_pods(graph, daemon_set);
        cover_pods(graph, &mut covered, &owned_pods);

        let view = Self {
            daemon_set,
            owned_pods,
            claimed: CoveredSet::new(),
        };
        (view, covered)
    }
}
