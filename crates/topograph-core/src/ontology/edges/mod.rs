//! Edge passes.
//!
//! Construction runs in two phases. The first creates a placeholder for
//! every dangling reference; the second runs the linking passes, which then
//! only read nodes and record edges. Relationships
//! that are matched by namespace-scoped names or selectors never cross
//! namespaces.
//!
//! - **Exposure**: ExposedThroughService, ExposedThroughRoute
//! - **Management**: ManagedByController, Deployment, Scaling
//! - **Images**: TriggersDeployment, UsedInDeployment, ReferencedImageStream,
//!   BuildOutput, BuildInputImage, BuildTriggerImage, Build
//! - **Configuration**: MountedSecret, MountableSecret,
//!   ReferencedServiceAccount, VolumeClaim

mod builds;
mod deployments;
mod exposure;
mod images;
mod ownership;
mod routes;
mod scaling;
mod secrets;
mod triggers;
mod volumes;

pub use builds::*;
pub use deployments::*;
pub use exposure::*;
pub use images::*;
pub use ownership::*;
pub use routes::*;
pub use scaling::*;
pub use secrets::*;
pub use triggers::*;
pub use volumes::*;

use builds::resolve_build_images;
use images::resolve_image_streams;
use log::debug;
use routes::resolve_route_backends;
use scaling::resolve_scale_targets;
use secrets::{resolve_mountable_secrets, resolve_mounted_secrets, resolve_service_accounts};
use triggers::resolve_trigger_sources;
use volumes::resolve_volume_claims;

use crate::graph::{Graph, NodeId, NodeKind};

/// A pass that records one family of edges.
pub type EdgePass = fn(&mut Graph);

/// Every linking pass. Once [`ensure_all_referenced_nodes`] has run, the
/// passes create no nodes, so any order and any number of repetitions yields
/// the same edges.
pub const EDGE_PASSES: &[(&str, EdgePass)] = &[
    ("exposed-pod-template-specs", add_all_exposed_pod_template_spec_edges),
    ("exposed-pods", add_all_exposed_pod_edges),
    ("managed-pods", add_all_managed_by_controller_pod_edges),
    ("deployments", add_all_deployment_edges),
    ("triggers", add_all_trigger_edges),
    ("scaling", add_all_scaling_edges),
    ("mountable-secrets", add_all_mountable_secret_edges),
    ("mounted-secrets", add_all_mounted_secret_edges),
    ("service-accounts", add_all_service_account_edges),
    ("volume-claims", add_all_volume_claim_edges),
    ("routes", add_all_route_edges),
    ("builds", add_all_build_edges),
    ("image-streams", add_all_image_stream_ref_edges),
];

/// Creates the placeholder for every reference any pass resolves.
///
/// Scale targets come first since a placeholder controller is itself a
/// deployment or trigger candidate; image stream tags come before the
/// streams they name. Placeholders carry no references of their own, so one
/// sweep reaches a fixed point.
pub fn ensure_all_referenced_nodes(graph: &mut Graph) {
    let before = graph.node_count();
    resolve_scale_targets(graph);
    resolve_trigger_sources(graph);
    resolve_build_images(graph);
    resolve_route_backends(graph);
    resolve_mountable_secrets(graph);
    resolve_mounted_secrets(graph);
    resolve_service_accounts(graph);
    resolve_volume_claims(graph);
    resolve_image_streams(graph);
    debug!("Created {} placeholder nodes", graph.node_count() - before);
}

/// Ensures referenced nodes, then runs every edge pass.
pub fn add_all_edges(graph: &mut Graph) {
    ensure_all_referenced_nodes(graph);
    for (name, pass) in EDGE_PASSES {
        let edges = graph.edge_count();
        pass(graph);
        debug!("Edge pass {} added {} edges", name, graph.edge_count() - edges);
    }

    debug!(
        "Topology has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
}

/// Ids of every pod-template controller, ascending.
pub(crate) fn controller_ids(graph: &Graph) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = [
        NodeKind::ReplicationController,
        NodeKind::ReplicaSet,
        NodeKind::StatefulSet,
        NodeKind::DaemonSet,
        NodeKind::Deployment,
        NodeKind::DeploymentConfig,
    ]
    .into_iter()
    .flat_map(|kind| graph.node_ids_by_kind(kind))
    .collect();
    ids.sort();
    ids
}
