//! Services, routes, autoscalers, service accounts, secrets and volume claims.

use crate::graph::{Graph, NodeId, NodeKind, NodeObject, UniqueName};
use crate::objects::{
    HorizontalPodAutoscaler, ObjectMeta, PersistentVolumeClaim, Route, Secret, Service, ServiceAccount,
};

fn unique(kind: NodeKind, meta: &ObjectMeta) -> UniqueName {
    UniqueName::of(kind, &meta.namespace, &meta.name)
}

pub fn ensure_service_node(graph: &mut Graph, service: &Service) -> NodeId {
    let name = unique(NodeKind::Service, &service.metadata);
    graph.ensure_found(name, || NodeObject::Service(service.clone()))
}

pub fn find_or_create_synthetic_service_node(graph: &mut Graph, namespace: &str, name: &str) -> NodeId {
    graph.ensure_synthetic(UniqueName::of(NodeKind::Service, namespace, name), || {
        NodeObject::Service(Service {
            metadata: ObjectMeta::named(namespace, name),
            ..Service::default()
        })
    })
}

pub fn ensure_route_node(graph: &mut Graph, route: &Route) -> NodeId {
    let name = unique(NodeKind::Route, &route.metadata);
    graph.ensure_found(name, || NodeObject::Route(route.clone()))
}

pub fn ensure_hpa_node(graph: &mut Graph, hpa: &HorizontalPodAutoscaler) -> NodeId {
    let name = unique(NodeKind::HorizontalPodAutoscaler, &hpa.metadata);
    graph.ensure_found(name, || NodeObject::HorizontalPodAutoscaler(hpa.clone()))
}

pub fn ensure_service_account_node(graph: &mut Graph, account: &ServiceAccount) -> NodeId {
    let name = unique(NodeKind::ServiceAccount, &account.metadata);
    graph.ensure_found(name, || NodeObject::ServiceAccount(account.clone()))
}

pub fn find_or_create_synthetic_service_account_node(graph: &mut Graph, namespace: &str, name: &str) -> NodeId {
    graph.ensure_synthetic(UniqueName::of(NodeKind::ServiceAccount, namespace, name), || {
        NodeObject::ServiceAccount(ServiceAccount {
            metadata: ObjectMeta::named(namespace, name),
            ..ServiceAccount::default()
        })
    })
}

pub fn ensure_secret_node(graph: &mut Graph, secret: &Secret) -> NodeId {
    let name = unique(NodeKind::Secret, &secret.metadata);
    graph.ensure_found(name, || NodeObject::Secret(secret.clone()))
}

pub fn find_or_create_synthetic_secret_node(graph: &mut Graph, namespace: &str, name: &str) -> NodeId {
    graph.ensure_synthetic(UniqueName::of(NodeKind::Secret, namespace, name), || {
        NodeObject::Secret(Secret {
            metadata: ObjectMeta::named(namespace, name),
            ..Secret::default()
        })
    })
}

pub fn ensure_pvc_node(graph: &mut Graph, claim: &PersistentVolumeClaim) -> NodeId {
    let name = unique(NodeKind::PersistentVolumeClaim, &claim.metadata);
    graph.ensure_found(name, || NodeObject::PersistentVolumeClaim(claim.clone()))
}

pub fn find_or_create_synthetic_pvc_node(graph: &mut Graph, namespace: &str, name: &str) -> NodeId {
    graph.ensure_synthetic(UniqueName::of(NodeKind::PersistentVolumeClaim, namespace, name), || {
        NodeObject::PersistentVolumeClaim(PersistentVolumeClaim {
            metadata: ObjectMeta::named(namespace, name),
            ..PersistentVolumeClaim::default()
        })
    })
}
