//! Deployment pipelines: a deployment controller, its replica history, the
//! images feeding it and the autoscalers targeting it.

use serde::Serialize;

use super::{workload_closure, CoveredSet, ImagePipeline, ReplicaView};
use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::{revision_annotation, DEPLOYMENT_VERSION_ANNOTATION};

/// Splits the replicas of a deployment controller into the active one and
/// the inactive rest.
///
/// Replicas are ordered by revision, newest first. The newest is active only
/// when its revision equals `target`; otherwise nothing is active and every
/// replica is inactive.
pub fn relevant_replicas<F>(
    graph: &Graph,
    replicas: &[NodeId],
    target: Option<i64>,
    revision_of: F,
) -> (Option<NodeId>, Vec<NodeId>)
where
    F: Fn(&NodeObject) -> Option<i64>,
{
    let mut ordered: Vec<(Option<i64>, NodeId)> = replicas
        .iter()
        .map(|&id| (graph.node(id).and_then(|n| revision_of(&n.object)), id))
        .collect();
    ordered.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut ids: Vec<NodeId> = ordered.iter().map(|(_, id)| *id).collect();
    match ordered.first() {
        Some((Some(revision), _)) if Some(*revision) == target => {
            let active = ids.remove(0);
            (Some(active), ids)
        }
        _ => (None, ids),
    }
}

/// Revision a ReplicationController was rolled out for.
pub fn replication_controller_revision(object: &NodeObject) -> Option<i64> {
    let rc = object.as_replication_controller()?;
    revision_annotation(&rc.metadata, DEPLOYMENT_VERSION_ANNOTATION)
}

/// Revision a ReplicaSet was rolled out for.
pub fn replica_set_revision(object: &NodeObject) -> Option<i64> {
    object.as_replica_set()?.revision()
}

/// Shared shape of DeploymentConfig and Deployment pipelines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPipelineParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ReplicaView>,
    /// Older or not yet current replicas, newest first.
    pub inactive: Vec<ReplicaView>,
    pub images: Vec<ImagePipeline>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scaled_by: Vec<NodeId>,
}

fn build_parts<F>(
    graph: &Graph,
    root: NodeId,
    replica_kind: NodeKind,
    target: Option<i64>,
    revision_of: F,
) -> (DeploymentPipelineParts, CoveredSet)
where
    F: Fn(&NodeObject) -> Option<i64>,
{
    let mut covered = workload_closure(graph, root);

    let replicas = graph.successors_of_kind(root, EdgeKind::Deployment, replica_kind);
    let (active_id, inactive_ids) = relevant_replicas(graph, &replicas, target, revision_of);

    let mut replica_view = |id: NodeId| {
        let (view, c) = ReplicaView::new(graph, id);
        covered.extend(c);
        view
    };
    let active = active_id.map(&mut replica_view);
    let inactive: Vec<ReplicaView> = inactive_ids.into_iter().map(&mut replica_view).collect();

    let mut image_ids = graph.predecessor_nodes_by_edge_kind(root, EdgeKind::TriggersDeployment);
    image_ids.extend(graph.predecessor_nodes_by_edge_kind(root, EdgeKind::UsedInDeployment));
    image_ids.sort();
    image_ids.dedup();
    let images = image_ids
        .into_iter()
        .map(|id| {
            let (pipeline, c) = ImagePipeline::for_image(graph, id);
            covered.extend(c);
            pipeline
        })
        .collect();

    let scaled_by = graph.predecessor_nodes_by_edge_kind(root, EdgeKind::Scaling);
    covered.extend(scaled_by.iter().copied());

    let parts = DeploymentPipelineParts {
        active,
        inactive,
        images,
        scaled_by,
    };
    (parts, covered)
}

/// A DeploymentConfig with its ReplicationControllers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigPipeline {
    pub deployment_config: NodeId,
    #[serde(flatten)]
    pub parts: DeploymentPipelineParts,
    pub claimed: CoveredSet,
}

impl DeploymentConfigPipeline {
    pub fn new(graph: &Graph, dc: NodeId) -> (Self, CoveredSet) {
        let target = graph
            .node(dc)
            .and_then(|n| n.object.as_deployment_config())
            .map(|dc| dc.status.latest_version);
        let (parts, covered) = build_parts(
            graph,
            dc,
            NodeKind::ReplicationController,
            target,
            replication_controller_revision,
        );
        let view = Self {
            deployment_config: dc,
            parts,
            claimed: CoveredSet::new(),
        };
        (view, covered)
    }
}

/// A Deployment with its ReplicaSets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPipeline {
    pub deployment: NodeId,
    #[serde(flatten)]
    pub parts: DeploymentPipelineParts,
    pub claimed: CoveredSet,
}

impl DeploymentPipeline {
    pub fn new(graph: &Graph, deployment: NodeId) -> (Self, CoveredSet) {
        let target = graph
            .node(deployment)
            .and_then(|n| n.object.as_deployment())
            .and_then(|d| d.revision());
        let (parts, covered) = build_parts(graph, deployment, NodeKind::ReplicaSet, target, replica_set_revision);
        let view = Self {
            deployment,
            parts,
            claimed: CoveredSet::new(),
        };
        (view, covered)
    }
}
