//! Pods and the controllers that stamp them out.
//!
//! A controller with a pod template becomes a containment chain
//! `controller -> controller spec -> pod template spec -> pod spec`.

use super::ensure_part;
use crate::graph::{Graph, NodeId, NodeKind, NodeObject, Part, UniqueName};
use crate::objects::{
    DaemonSet, Deployment, DeploymentConfig, ObjectMeta, Pod, PodSpec, PodTemplateSpec, ReplicaSet,
    ReplicationController, StatefulSet,
};

// =============================================================================
// PODS
// =============================================================================

pub fn ensure_pod_node(graph: &mut Graph, pod: &Pod) -> NodeId {
    let meta = &pod.metadata;
    let name = UniqueName::of(NodeKind::Pod, &meta.namespace, &meta.name);
    let id = graph.ensure_found(name, || NodeObject::Pod(pod.clone()));
    ensure_pod_spec_node(graph, id, NodeKind::Pod, meta, &pod.spec);
    id
}

/// Ensures the pod spec contained by `owner`.
pub fn ensure_pod_spec_node(
    graph: &mut Graph,
    owner: NodeId,
    owner_kind: NodeKind,
    owner_meta: &ObjectMeta,
    spec: &PodSpec,
) -> NodeId {
    ensure_part(
        graph,
        owner,
        NodeObject::PodSpec(part(owner_kind, owner_meta, spec.clone())),
    )
}

/// Ensures a pod template and its pod spec below the controller spec `owner`.
pub fn ensure_pod_template_spec_node(
    graph: &mut Graph,
    owner: NodeId,
    owner_kind: NodeKind,
    owner_meta: &ObjectMeta,
    template: &PodTemplateSpec,
) -> NodeId {
    let id = ensure_part(
        graph,
        owner,
        NodeObject::PodTemplateSpec(part(owner_kind, owner_meta, template.clone())),
    );
    ensure_pod_spec_node(graph, id, owner_kind, owner_meta, &template.spec);
    id
}

fn part<T>(owner_kind: NodeKind, owner_meta: &ObjectMeta, spec: T) -> Part<T> {
    Part {
        namespace: owner_meta.namespace.clone(),
        owner_kind,
        owner_name: owner_meta.name.clone(),
        spec,
    }
}

// =============================================================================
// CONTROLLERS
// =============================================================================

/// Ensures a controller node, its spec part and, when present, the template chain.
fn ensure_controller(
    graph: &mut Graph,
    meta: &ObjectMeta,
    object: NodeObject,
    spec: NodeObject,
    template: Option<&PodTemplateSpec>,
) -> NodeId {
    let kind = object.kind();
    let name = UniqueName::of(kind, &meta.namespace, &meta.name);
    let id = graph.ensure_found(name, || object);
    let spec_id = ensure_part(graph, id, spec);
    if let Some(template) = template {
        ensure_pod_template_spec_node(graph, spec_id, kind, meta, template);
    }
    id
}

pub fn ensure_replication_controller_node(graph: &mut Graph, rc: &ReplicationController) -> NodeId {
    let kind = NodeKind::ReplicationController;
    ensure_controller(
        graph,
        &rc.metadata,
        NodeObject::ReplicationController(rc.clone()),
        NodeObject::ReplicationControllerSpec(part(kind, &rc.metadata, rc.spec.clone())),
        rc.spec.template.as_ref(),
    )
}

pub fn ensure_replica_set_node(graph: &mut Graph, rs: &ReplicaSet) -> NodeId {
    let kind = NodeKind::ReplicaSet;
    ensure_controller(
        graph,
        &rs.metadata,
        NodeObject::ReplicaSet(rs.clone()),
        NodeObject::ReplicaSetSpec(part(kind, &rs.metadata, rs.spec.clone())),
        rs.spec.template.as_ref(),
    )
}

pub fn ensure_stateful_set_node(graph: &mut Graph, set: &StatefulSet) -> NodeId {
    let kind = NodeKind::StatefulSet;
    ensure_controller(
        graph,
        &set.metadata,
        NodeObject::StatefulSet(set.clone()),
        NodeObject::StatefulSetSpec(part(kind, &set.metadata, set.spec.clone())),
        Some(&set.spec.template),
    )
}

pub fn ensure_daemon_set_node(graph: &mut Graph, set: &DaemonSet) -> NodeId {
    let kind = NodeKind::DaemonSet;
    ensure_controller(
        graph,
        &set.metadata,
        NodeObject::DaemonSet(set.clone()),
        NodeObject::DaemonSetSpec(part(kind, &set.metadata, set.spec.clone())),
        Some(&set.spec.template),
    )
}

pub fn ensure_deployment_node(graph: &mut Graph, deployment: &Deployment) -> NodeId {
    let kind = NodeKind::Deployment;
    ensure_controller(
        graph,
        &deployment.metadata,
        NodeObject::Deployment(deployment.clone()),
        NodeObject::DeploymentSpec(part(kind, &deployment.metadata, deployment.spec.clone())),
        Some(&deployment.spec.template),
    )
}

pub fn ensure_deployment_config_node(graph: &mut Graph, dc: &DeploymentConfig) -> NodeId {
    let kind = NodeKind::DeploymentConfig;
    ensure_controller(
        graph,
        &dc.metadata,
        NodeObject::DeploymentConfig(dc.clone()),
        NodeObject::DeploymentConfigSpec(part(kind, &dc.metadata, dc.spec.clone())),
        dc.spec.template.as_ref(),
    )
}

// =============================================================================
// SYNTHETIC CONTROLLERS
// =============================================================================

/// Placeholder controller of `kind`. Returns `None` for kinds that are not controllers.
pub fn find_or_create_synthetic_controller_node(
    graph: &mut Graph,
    kind: NodeKind,
    namespace: &str,
    name: &str,
) -> Option<NodeId> {
    if !kind.is_pod_template_controller() {
        return None;
    }
    Some(synthetic_controller(graph, kind, namespace, name))
}

fn synthetic_controller(graph: &mut Graph, kind: NodeKind, namespace: &str, name: &str) -> NodeId {
    let unique = UniqueName::of(kind, namespace, name);
    graph.ensure_synthetic(unique, || {
        let metadata = ObjectMeta::named(namespace, name);
        match kind {
            NodeKind::ReplicaSet => NodeObject::ReplicaSet(ReplicaSet {
                metadata,
                ..ReplicaSet::default()
            }),
            NodeKind::StatefulSet => NodeObject::StatefulSet(StatefulSet {
                metadata,
                ..StatefulSet::default()
            }),
            NodeKind::DaemonSet => NodeObject::DaemonSet(DaemonSet {
                metadata,
                ..DaemonSet::default()
            }),
            NodeKind::Deployment => NodeObject::Deployment(Deployment {
                metadata,
                ..Deployment::default()
            }),
            NodeKind::DeploymentConfig => NodeObject::DeploymentConfig(DeploymentConfig {
                metadata,
                ..DeploymentConfig::default()
            }),
            _ => NodeObject::ReplicationController(ReplicationController {
                metadata,
                ..ReplicationController::default()
            }),
        }
    })
}
