use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, Node, NodeKind, NodeObject, Severity};

use super::{is_found, name_of, top_level_controllers, AnalysisContext};

/// Whether the controller may run more than one pod at the same time.
fn may_run_multiple_pods(object: &NodeObject) -> bool {
    match object {
        NodeObject::DaemonSet(_) => true,
        NodeObject::DeploymentConfig(dc) => dc.spec.replicas > 1 || dc.may_surge(),
        NodeObject::Deployment(d) => d.spec.replicas.unwrap_or(1) > 1 || d.may_surge(),
        NodeObject::StatefulSet(s) => s.spec.replicas.unwrap_or(1) > 1,
        NodeObject::ReplicationController(rc) => rc.spec.replicas.unwrap_or(1) > 1,
        NodeObject::ReplicaSet(rs) => rs.spec.replicas.unwrap_or(1) > 1,
        _ => false,
    }
}

fn claims_of<'a>(graph: &'a Graph, controller: &Node) -> impl Iterator<Item = &'a Node> {
    graph
        .successors_of_kind(controller.id, EdgeKind::VolumeClaim, NodeKind::PersistentVolumeClaim)
        .into_iter()
        .filter_map(|id| graph.node(id))
}

/// Finds controllers that may run several pods against a claim only one
/// host can mount read-write.
pub fn find_single_host_volumes(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for controller in top_level_controllers(graph) {
        if !may_run_multiple_pods(&controller.object) {
            continue;
        }
        for claim in claims_of(graph, controller) {
            let single_host = claim.found && claim.object.as_pvc().is_some_and(|pvc| pvc.is_single_host());
            if !single_host {
                continue;
            }
            let controller_name = namer.resource_name(controller);
            markers.push(
                Marker::new(
                    controller.id,
                    Severity::Warning,
                    MarkerKey::SingleHostVolume,
                    format!(
                        "{} references a volume claim {} that can only be used by one host at a time, but may run more than one pod",
                        controller_name,
                        namer.resource_name(claim)
                    ),
                )
                .with_related([claim.id])
                .with_suggestion(format!(
                    "Scale {controller_name} to one replica with a non-surging strategy, or use a claim with the ReadWriteMany access mode."
                )),
            );
        }
    }
    markers
}

/// Finds controllers mounting claims that do not exist.
pub fn find_missing_volume_claims(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for controller in top_level_controllers(graph) {
        for claim in claims_of(graph, controller).filter(|c| !is_found(graph, c.id)) {
            markers.push(
                Marker::new(
                    controller.id,
                    Severity::Warning,
                    MarkerKey::MissingPersistentVolumeClaim,
                    format!(
                        "{} is attempting to mount a missing persistent volume claim {}",
                        namer.resource_name(controller),
                        name_of(graph, namer, claim.id)
                    ),
                )
                .with_related([claim.id]),
            );
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, namer};
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::objects::{
        AccessMode, DeploymentConfig, DeploymentConfigStrategyType, ObjectMeta, PersistentVolumeClaim,
        PersistentVolumeClaimVolumeSource, PodTemplateSpec, Volume,
    };

    fn dc_with_claim(replicas: i32, strategy: DeploymentConfigStrategyType) -> DeploymentConfig {
        let mut template = PodTemplateSpec::default();
        template.spec.volumes.push(Volume {
            name: "data".to_string(),
            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                claim_name: "data".to_string(),
                read_only: false,
            }),
            ..Volume::default()
        });
        let mut dc = DeploymentConfig {
            metadata: ObjectMeta::named("ns", "db"),
            ..DeploymentConfig::default()
        };
        dc.spec.replicas = replicas;
        dc.spec.strategy.strategy_type = strategy;
        dc.spec.template = Some(template);
        dc
    }

    fn rwo_claim() -> PersistentVolumeClaim {
        let mut pvc = PersistentVolumeClaim {
            metadata: ObjectMeta::named("ns", "data"),
            ..PersistentVolumeClaim::default()
        };
        pvc.spec.access_modes.push(AccessMode::ReadWriteOnce);
        pvc
    }

    #[test]
    fn test_single_host_volume_with_replicas() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_deployment_config(&dc_with_claim(2, DeploymentConfigStrategyType::Recreate))
            .unwrap();
        builder.add_persistent_volume_claim(&rwo_claim()).unwrap();
        let graph = builder.build();

        let markers = find_single_host_volumes(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, MarkerKey::SingleHostVolume);
    }

    #[test]
    fn test_single_replica_recreate_is_fine() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_deployment_config(&dc_with_claim(1, DeploymentConfigStrategyType::Recreate))
            .unwrap();
        builder.add_persistent_volume_claim(&rwo_claim()).unwrap();
        let graph = builder.build();

        assert!(find_single_host_volumes(&graph, &namer(), &ctx()).is_empty());
    }

    #[test]
    fn test_rolling_strategy_surges() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_deployment_config(&dc_with_claim(1, DeploymentConfigStrategyType::Rolling))
            .unwrap();
        builder.add_persistent_volume_claim(&rwo_claim()).unwrap();
        let graph = builder.build();

        assert_eq!(find_single_host_volumes(&graph, &namer(), &ctx()).len(), 1);
    }

    #[test]
    fn test_missing_claim() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_deployment_config(&dc_with_claim(1, DeploymentConfigStrategyType::Recreate))
            .unwrap();
        let graph = builder.build();

        let markers = find_missing_volume_claims(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].message, "dc/db is attempting to mount a missing persistent volume claim pvc/data");
        assert!(find_single_host_volumes(&graph, &namer(), &ctx()).is_empty());
    }
}
