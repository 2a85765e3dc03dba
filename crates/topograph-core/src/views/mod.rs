//! Aggregated views over the topology graph.
//!
//! A view starts at a root node, walks a fixed set of edge kinds and reports
//! the node ids it covers. [`ProjectViews::build`] applies the views in
//! priority order so that each node is claimed by the first view covering it.
//!
//! ## Modules
//!
//! - `service` - service groups
//! - `pipelines` - DeploymentConfig and Deployment pipelines with replica history
//! - `replicas` - ReplicationController, ReplicaSet, StatefulSet and DaemonSet views
//! - `images` - image pipelines with their build configs and builds

mod images;
mod pipelines;
mod replicas;
mod service;

pub use images::*;
pub use pipelines::*;
pub use replicas::*;
pub use service::*;

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind};

/// Node ids covered by a view.
pub type CoveredSet = BTreeSet<NodeId>;

/// The containment closure of a workload plus the configuration it uses:
/// mounted secrets and the service account of each pod spec, that account's
/// mountable secrets, and the root's volume claims.
pub(crate) fn workload_closure(graph: &Graph, root: NodeId) -> CoveredSet {
    let mut covered = graph.containment_closure(root);
    let mut leaves = graph.successor_nodes_by_edge_kind(root, EdgeKind::VolumeClaim);
    for &part in &covered {
        if graph.kind_of(part) != Some(NodeKind::PodSpec) {
            continue;
        }
        leaves.extend(graph.successor_nodes_by_edge_kind(part, EdgeKind::MountedSecret));
        for account in graph.successor_nodes_by_edge_kind(part, EdgeKind::ReferencedServiceAccount) {
            leaves.push(account);
            leaves.extend(graph.successor_nodes_by_edge_kind(account, EdgeKind::MountableSecret));
        }
    }
    covered.extend(leaves);
    covered
}

/// Every view of a graph, in driver order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectViews {
    pub service_groups: Vec<ServiceGroup>,
    pub deployment_config_pipelines: Vec<DeploymentConfigPipeline>,
    pub deployment_pipelines: Vec<DeploymentPipeline>,
    pub stateful_sets: Vec<StatefulSetView>,
    pub daemon_sets: Vec<DaemonSetView>,
    pub replication_controllers: Vec<ReplicaView>,
    pub replica_sets: Vec<ReplicaView>,
    pub image_pipelines: Vec<ImagePipeline>,
}

/// Running union of everything covered so far.
#[derive(Debug, Default)]
struct Coverage {
    covered: CoveredSet,
}

impl Coverage {
    fn is_covered(&self, id: NodeId) -> bool {
        self.covered.contains(&id)
    }

    /// Records `covered` and returns the part not claimed before.
    fn claim(&mut self, covered: CoveredSet) -> CoveredSet {
        let fresh: CoveredSet = covered.difference(&self.covered).copied().collect();
        self.covered.extend(fresh.iter().copied());
        fresh
    }

    /// Roots of `kind` not yet covered, ascending.
    fn uncovered(&self, graph: &Graph, kind: NodeKind) -> Vec<NodeId> {
        graph
            .node_ids_by_kind(kind)
            .into_iter()
            .filter(|&id| !self.is_covered(id))
            .collect()
    }
}

impl ProjectViews {
    /// Builds every view in priority order: services, DeploymentConfigs,
    /// Deployments, StatefulSets, DaemonSets, bare ReplicationControllers,
    /// bare ReplicaSets, bare BuildConfigs.
    ///
    /// Roots already covered by an earlier view are skipped.
    pub fn build(graph: &Graph) -> Self {
        let mut views = Self::default();
        let mut coverage = Coverage::default();

        for id in coverage.uncovered(graph, NodeKind::Service) {
            let (mut view, covered) = ServiceGroup::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.service_groups.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::DeploymentConfig) {
            let (mut view, covered) = DeploymentConfigPipeline::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.deployment_config_pipelines.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::Deployment) {
            let (mut view, covered) = DeploymentPipeline::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.deployment_pipelines.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::StatefulSet) {
            let (mut view, covered) = StatefulSetView::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.stateful_sets.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::DaemonSet) {
            let (mut view, covered) = DaemonSetView::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.daemon_sets.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::ReplicationController) {
            let (mut view, covered) = ReplicaView::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.replication_controllers.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::ReplicaSet) {
            let (mut view, covered) = ReplicaView::new(graph, id);
            view.claimed = coverage.claim(covered);
            views.replica_sets.push(view);
        }
        for id in coverage.uncovered(graph, NodeKind::BuildConfig) {
            let (mut view, covered) = ImagePipeline::for_build_config(graph, id);
            view.claimed = coverage.claim(covered);
            views.image_pipelines.push(view);
        }

        debug!(
            "Views cover {} of {} nodes",
            coverage.covered.len(),
            graph.node_count()
        );
        views
    }

    /// The claim of every top-level view, in driver order.
    pub fn claims(&self) -> Vec<&CoveredSet> {
        let mut claims: Vec<&CoveredSet> = Vec::new();
        claims.extend(self.service_groups.iter().map(|v| &v.claimed));
        claims.extend(self.deployment_config_pipelines.iter().map(|v| &v.claimed));
        claims.extend(self.deployment_pipelines.iter().map(|v| &v.claimed));
        claims.extend(self.stateful_sets.iter().map(|v| &v.claimed));
        claims.extend(self.daemon_sets.iter().map(|v| &v.claimed));
        claims.extend(self.replication_controllers.iter().map(|v| &v.claimed));
        claims.extend(self.replica_sets.iter().map(|v| &v.claimed));
        claims.extend(self.image_pipelines.iter().map(|v| &v.claimed));
        claims
    }

    /// Union of every claim.
    pub fn covered(&self) -> CoveredSet {
        self.claims().into_iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, NodeObject};
    use crate::objects::{ObjectMeta, ReplicationController, DEPLOYMENT_VERSION_ANNOTATION};
    use crate::ontology::nodes::ensure_replication_controller_node;

    fn rc(graph: &mut Graph, name: &str, version: Option<&str>) -> NodeId {
        let mut meta = ObjectMeta::named("ns", name);
        if let Some(v) = version {
            meta = meta.with_annotation(DEPLOYMENT_VERSION_ANNOTATION, v);
        }
        ensure_replication_controller_node(
            graph,
            &ReplicationController {
                metadata: meta,
                ..ReplicationController::default()
            },
        )
    }

    #[test]
    fn test_relevant_replicas_active_matches_target() {
        let mut graph = Graph::new();
        let one = rc(&mut graph, "web-1", Some("1"));
        let two = rc(&mut graph, "web-2", Some("2"));
        let three = rc(&mut graph, "web-3", Some("3"));

        let (active, inactive) =
            relevant_replicas(&graph, &[one, three, two], Some(3), replication_controller_revision);
        assert_eq!(active, Some(three));
        assert_eq!(inactive, vec![two, one]);
    }

    #[test]
    fn test_relevant_replicas_newest_not_current() {
        let mut graph = Graph::new();
        let one = rc(&mut graph, "web-1", Some("1"));
        let two = rc(&mut graph, "web-2", Some("2"));

        let (active, inactive) = relevant_replicas(&graph, &[one, two], Some(3), replication_controller_revision);
        assert_eq!(active, None);
        assert_eq!(inactive, vec![two, one]);
    }

    #[test]
    fn test_claims_are_disjoint() {
        let mut graph = Graph::new();
        let a = rc(&mut graph, "a", None);
        let b = rc(&mut graph, "b", None);
        // A shared dependent covered by both views is claimed by the first only.
        let shared = graph.contained_of_kind(b, NodeKind::ReplicationControllerSpec).unwrap();
        graph.add_edge(a, shared, EdgeKind::Contains);
        assert!(matches!(graph.node(shared).unwrap().object, NodeObject::ReplicationControllerSpec(_)));

        let views = ProjectViews::build(&graph);
        let claims = views.claims();
        assert_eq!(claims.len(), 2);
        assert!(claims[0].contains(&shared));
        assert!(!claims[1].contains(&shared));
        assert!(claims[0].is_disjoint(claims[1]));
        assert_eq!(views.covered().len(), graph.node_count());
    }
}
