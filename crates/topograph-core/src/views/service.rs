//! Service groups: a service with everything that backs or exposes it.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{
    workload_closure, CoveredSet, DaemonSetView, DeploymentConfigPipeline, DeploymentPipeline, ReplicaView,
    StatefulSetView,
};
use crate::graph::{EdgeKind, Graph, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceGroup {
    pub service: NodeId,
    pub deployment_config_pipelines: Vec<DeploymentConfigPipeline>,
    pub deployment_pipelines: Vec<DeploymentPipeline>,
    pub replication_controllers: Vec<ReplicaView>,
    pub replica_sets: Vec<ReplicaView>,
    pub stateful_sets: Vec<StatefulSetView>,
    pub daemon_sets: Vec<DaemonSetView>,
    /// Exposed pods not accounted for by any controller view of the group.
    pub fulfilling_pods: Vec<NodeId>,
    pub exposing_routes: Vec<NodeId>,
    pub claimed: CoveredSet,
}

/// The deployment controller managing a replica, if any.
fn managing_deployment(graph: &Graph, replica: NodeId, kind: NodeKind) -> Option<NodeId> {
    graph
        .successors_of_kind(replica, EdgeKind::ManagedByController, kind)
        .first()
        .copied()
}

impl ServiceGroup {
    pub fn new(graph: &Graph, service: NodeId) -> (Self, CoveredSet) {
        let mut covered = CoveredSet::from([service]);
        let mut group = Self {
            service,
            deployment_config_pipelines: Vec::new(),
            deployment_pipelines: Vec::new(),
            replication_controllers: Vec::new(),
            replica_sets: Vec::new(),
            stateful_sets: Vec::new(),
            daemon_sets: Vec::new(),
            fulfilling_pods: Vec::new(),
            exposing_routes: Vec::new(),
            claimed: CoveredSet::new(),
        };

        group.exposing_routes = graph.predecessors_of_kind(service, EdgeKind::ExposedThroughRoute, NodeKind::Route);
        covered.extend(group.exposing_routes.iter().copied());

        // Resolve every exposed template or pod to the view root it belongs to.
        let mut roots: BTreeSet<NodeId> = BTreeSet::new();
        let mut pods: Vec<NodeId> = Vec::new();
        for exposed in graph.predecessor_nodes_by_edge_kind(service, EdgeKind::ExposedThroughService) {
            let top = graph.top_level_container(exposed);
            let root = match graph.kind_of(top) {
                Some(NodeKind::Pod) => {
                    pods.push(top);
                    continue;
                }
                Some(NodeKind::ReplicationController) => {
                    managing_deployment(graph, top, NodeKind::DeploymentConfig).unwrap_or(top)
                }
                Some(NodeKind::ReplicaSet) => managing_deployment(graph, top, NodeKind::Deployment).unwrap_or(top),
                Some(_) => top,
                None => continue,
            };
            roots.insert(root);
        }

        for root in roots {
            match graph.kind_of(root) {
                Some(NodeKind::DeploymentConfig) => {
                    let (view, c) = DeploymentConfigPipeline::new(graph, root);
                    covered.extend(c);
                    group.deployment_config_pipelines.push(view);
                }
                Some(NodeKind::Deployment) => {
                    let (view, c) = DeploymentPipeline::new(graph, root);
                    covered.extend(c);
                    group.deployment_pipelines.push(view);
                }
                Some(NodeKind::ReplicationController) => {
                    let (view, c) = ReplicaView::new(graph, root);
                    covered.extend(c);
                    group.replication_controllers.push(view);
                }
                Some(NodeKind::ReplicaSet) => {
                    let (view, c) = ReplicaView::new(graph, root);
                    covered.extend(c);
                    group.replica_sets.push(view);
                }
                Some(NodeKind::StatefulSet) => {
                    let (view, c) = StatefulSetView::new(graph, root);
                    covered.extend(c);
                    group.stateful_sets.push(view);
                }
                Some(NodeKind::DaemonSet) => {
                    let (view, c) = DaemonSetView::new(graph, root);
                    covered.extend(c);
                    group.daemon_sets.push(view);
                }
                _ => {}
            }
        }

        pods.sort();
        pods.dedup();
        for pod in pods {
            if !covered.contains(&pod) {
                group.fulfilling_pods.push(pod);
                covered.extend(workload_closure(graph, pod));
            }
        }

        (group, covered)
    }
}
