//! Diagnostic rules over a finished topology graph.
//!
//! Every rule is a pure function `(graph, namer, ctx) -> Vec<Marker>`. Rules
//! never mutate the graph and never see each other's output, so they can run
//! in any order; [`analyze`] runs all of them and sorts the result.
//!
//! ## Modules
//!
//! - `images` - triggers waiting on images that do not exist
//! - `probes` - pod templates without readiness or liveness probes
//! - `pods` - crash-looping, restarting and multiply-managed pods
//! - `volumes` - missing and single-host volume claims
//! - `secrets` - missing and unmountable secrets
//! - `autoscaling` - autoscalers with bad or overlapping targets
//! - `routes` - routes to missing services
//! - `builds` - build configs with missing outputs, cycles or failed builds

mod autoscaling;
mod builds;
mod images;
mod pods;
mod probes;
mod routes;
mod secrets;
mod volumes;

pub use autoscaling::{find_hpa_missing_cpu_targets, find_hpa_missing_scale_refs, find_overlapping_hpas};
pub use builds::{find_circular_builds, find_failed_latest_builds, find_missing_output_image_streams};
pub use images::find_missing_trigger_images;
pub use pods::{find_dueling_replication_controllers, find_restarting_pods};
pub use probes::{find_missing_liveness_probes, find_missing_readiness_probes};
pub use routes::find_missing_route_services;
pub use secrets::{find_missing_secrets, find_unmountable_secrets};
pub use volumes::{find_missing_volume_claims, find_single_host_volumes};

use chrono::{DateTime, Utc};
use log::debug;

use crate::config::{AnalysisConfig, Config};
use crate::graph::{EdgeKind, Graph, Marker, Markers, Namer, Node, NodeId, NodeKind};

/// Inputs shared by every rule besides the graph.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Reference time for windowed rules.
    pub now: DateTime<Utc>,
    pub config: AnalysisConfig,
}

impl AnalysisContext {
    pub fn new(now: DateTime<Utc>, config: AnalysisConfig) -> Self {
        Self { now, config }
    }

    pub fn from_config(now: DateTime<Utc>, config: &Config) -> Self {
        Self::new(now, config.analysis.clone())
    }

    /// Whether `at` lies within the restart window before `now`.
    pub fn is_recent(&self, at: DateTime<Utc>) -> bool {
        at <= self.now && self.now.signed_duration_since(at) <= self.config.restart_window()
    }
}

/// A rule over the graph.
pub type Rule = fn(&Graph, &dyn Namer, &AnalysisContext) -> Vec<Marker>;

/// Every rule, in the order they are run.
pub const RULES: &[(&str, Rule)] = &[
    ("missing-trigger-images", find_missing_trigger_images),
    ("missing-readiness-probes", find_missing_readiness_probes),
    ("missing-liveness-probes", find_missing_liveness_probes),
    ("restarting-pods", find_restarting_pods),
    ("dueling-replication-controllers", find_dueling_replication_controllers),
    ("single-host-volumes", find_single_host_volumes),
    ("missing-volume-claims", find_missing_volume_claims),
    ("missing-secrets", find_missing_secrets),
    ("unmountable-secrets", find_unmountable_secrets),
    ("hpa-missing-scale-refs", find_hpa_missing_scale_refs),
    ("hpa-missing-cpu-targets", find_hpa_missing_cpu_targets),
    ("overlapping-hpas", find_overlapping_hpas),
    ("missing-route-services", find_missing_route_services),
    ("missing-output-image-streams", find_missing_output_image_streams),
    ("circular-builds", find_circular_builds),
    ("failed-latest-builds", find_failed_latest_builds),
];

/// Runs every rule and returns the markers errors first.
pub fn analyze(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Markers {
    let mut markers = Markers::new();
    for (name, rule) in RULES {
        let found = rule(graph, namer, ctx);
        debug!("Rule {} produced {} markers", name, found.len());
        markers.extend(found);
    }
    markers.sort_by_severity();
    markers
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Name of `id` according to `namer`, or the raw id for unknown nodes.
pub(crate) fn name_of(graph: &Graph, namer: &dyn Namer, id: NodeId) -> String {
    graph
        .node(id)
        .map_or_else(|| id.to_string(), |node| namer.resource_name(node))
}

/// Found nodes of `kind`, ascending by id.
pub(crate) fn found_nodes(graph: &Graph, kind: NodeKind) -> impl Iterator<Item = &Node> {
    graph.nodes_by_kind(kind).into_iter().filter(|n| n.found)
}

/// Whether a found node exists at `id`.
pub(crate) fn is_found(graph: &Graph, id: NodeId) -> bool {
    graph.node(id).is_some_and(|n| n.found)
}

/// Controllers that own their pod template outright: deployment controllers,
/// StatefulSets, DaemonSets, and replicas no deployment controller manages.
pub(crate) fn top_level_controllers(graph: &Graph) -> Vec<&Node> {
    let mut out: Vec<&Node> = Vec::new();
    for kind in [
        NodeKind::DeploymentConfig,
        NodeKind::Deployment,
        NodeKind::StatefulSet,
        NodeKind::DaemonSet,
    ] {
        out.extend(found_nodes(graph, kind));
    }
    for (kind, manager) in [
        (NodeKind::ReplicationController, NodeKind::DeploymentConfig),
        (NodeKind::ReplicaSet, NodeKind::Deployment),
    ] {
        out.extend(
            found_nodes(graph, kind)
                .filter(|n| graph.successors_of_kind(n.id, EdgeKind::ManagedByController, manager).is_empty()),
        );
    }
    out.sort_by_key(|n| n.id);
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::TimeZone;

    use super::*;
    use crate::graph::NamespacedNamer;

    pub fn namer() -> NamespacedNamer {
        NamespacedNamer::new("ns")
    }

    pub fn ctx() -> AnalysisContext {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        AnalysisContext::new(now, AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::test_support::ctx;
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::objects::{Deployment, ObjectMeta, OwnerReference, ReplicaSet, ReplicationController};

    #[test]
    fn test_is_recent_window() {
        let ctx = ctx();
        assert!(ctx.is_recent(ctx.now - Duration::minutes(9)));
        assert!(ctx.is_recent(ctx.now - Duration::minutes(10)));
        assert!(!ctx.is_recent(ctx.now - Duration::minutes(11)));
        assert!(!ctx.is_recent(ctx.now + Duration::minutes(1)));
    }

    #[test]
    fn test_top_level_controllers_skip_managed_replicas() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_deployment(&Deployment {
                metadata: ObjectMeta::named("ns", "web"),
                ..Deployment::default()
            })
            .unwrap();
        let mut owned = ObjectMeta::named("ns", "web-1");
        owned.owner_references.push(OwnerReference::controller("Deployment", "web"));
        builder
            .add_replica_set(&ReplicaSet {
                metadata: owned,
                ..ReplicaSet::default()
            })
            .unwrap();
        builder
            .add_replication_controller(&ReplicationController {
                metadata: ObjectMeta::named("ns", "bare"),
                ..ReplicationController::default()
            })
            .unwrap();
        let graph = builder.build();

        let kinds: Vec<NodeKind> = top_level_controllers(&graph).iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Deployment, NodeKind::ReplicationController]);
    }

    #[test]
    fn test_analyze_empty_graph() {
        let graph = Graph::new();
        let markers = analyze(&graph, &test_support::namer(), &ctx());
        assert!(markers.is_empty());
    }
}
