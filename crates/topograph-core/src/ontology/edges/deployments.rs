//! Deployment controllers and the replicas they roll out.

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::DEPLOYMENT_CONFIG_ANNOTATION;

/// Links DeploymentConfigs to their ReplicationControllers and Deployments
/// to their ReplicaSets.
///
/// The forward edge is `Deployment`; the replica points back with
/// `ManagedByController`.
pub fn add_all_deployment_edges(graph: &mut Graph) {
    let mut pairs = deployment_config_pairs(graph);
    pairs.extend(deployment_pairs(graph));
    for (owner, replica) in pairs {
        graph.add_edge(owner, replica, EdgeKind::Deployment);
        graph.add_edge(replica, owner, EdgeKind::ManagedByController);
    }
}

/// A ReplicationController belongs to a DeploymentConfig in its namespace
/// through an owner reference or the deployment-config annotation.
fn deployment_config_pairs(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let rcs = graph.nodes_by_kind(NodeKind::ReplicationController);
    let mut pairs = Vec::new();
    for dc_node in graph.nodes_by_kind(NodeKind::DeploymentConfig) {
        let Some(dc) = dc_node.object.as_deployment_config() else {
            continue;
        };
        for rc_node in &rcs {
            let Some(rc) = rc_node.object.as_replication_controller() else {
                continue;
            };
            if rc.metadata.namespace != dc.metadata.namespace {
                continue;
            }
            let owned = rc
                .metadata
                .owner_references
                .iter()
                .any(|r| r.kind == "DeploymentConfig" && r.name == dc.metadata.name);
            let annotated = rc.metadata.annotation(DEPLOYMENT_CONFIG_ANNOTATION) == Some(dc.metadata.name.as_str());
            if owned || annotated {
                pairs.push((dc_node.id, rc_node.id));
            }
        }
    }
    pairs
}

/// A ReplicaSet belongs to the Deployment named by its controller reference.
fn deployment_pairs(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let sets = graph.nodes_by_kind(NodeKind::ReplicaSet);
    let mut pairs = Vec::new();
    for d_node in graph.nodes_by_kind(NodeKind::Deployment) {
        let NodeObject::Deployment(deployment) = &d_node.object else {
            continue;
        };
        for rs_node in &sets {
            let Some(rs) = rs_node.object.as_replica_set() else {
                continue;
            };
            if rs.metadata.namespace == deployment.metadata.namespace
                && rs.metadata.is_controlled_by("Deployment", &deployment.metadata)
            {
                pairs.push((d_node.id, rs_node.id));
            }
        }
    }
    pairs
}
