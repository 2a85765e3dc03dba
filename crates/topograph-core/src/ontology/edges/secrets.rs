//! Secrets and service accounts.

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::ontology::nodes::{find_or_create_synthetic_secret_node, find_or_create_synthetic_service_account_node};

/// Service accounts -> the secrets they list as mountable.
pub fn add_all_mountable_secret_edges(graph: &mut Graph) {
    for (account, secret) in resolve_mountable_secrets(graph) {
        graph.add_edge(account, secret, EdgeKind::MountableSecret);
    }
}

pub(crate) fn resolve_mountable_secrets(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let mut refs: Vec<(NodeId, String, String)> = Vec::new();
    for node in graph.nodes_by_kind(NodeKind::ServiceAccount) {
        let NodeObject::ServiceAccount(account) = &node.object else {
            continue;
        };
        for secret in account.secrets.iter().filter(|s| !s.name.is_empty()) {
            let namespace = secret.namespace_or(node.namespace()).to_string();
            refs.push((node.id, namespace, secret.name.clone()));
        }
    }

    refs.into_iter()
        .map(|(account, namespace, name)| (account, find_or_create_synthetic_secret_node(graph, &namespace, &name)))
        .collect()
}

/// Pod specs -> the secrets they mount as volumes.
pub fn add_all_mounted_secret_edges(graph: &mut Graph) {
    for (spec, secret) in resolve_mounted_secrets(graph) {
        graph.add_edge(spec, secret, EdgeKind::MountedSecret);
    }
}

pub(crate) fn resolve_mounted_secrets(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let mut refs: Vec<(NodeId, String, String)> = Vec::new();
    for node in graph.nodes_by_kind(NodeKind::PodSpec) {
        let Some(spec) = node.object.pod_spec() else {
            continue;
        };
        for name in spec.secret_volume_names() {
            refs.push((node.id, node.namespace().to_string(), name.to_string()));
        }
    }

    refs.into_iter()
        .map(|(spec, namespace, name)| (spec, find_or_create_synthetic_secret_node(graph, &namespace, &name)))
        .collect()
}

/// Pod specs -> the service account they run as.
pub fn add_all_service_account_edges(graph: &mut Graph) {
    for (spec, account) in resolve_service_accounts(graph) {
        graph.add_edge(spec, account, EdgeKind::ReferencedServiceAccount);
    }
}

pub(crate) fn resolve_service_accounts(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let refs: Vec<(NodeId, String, String)> = graph
        .nodes_by_kind(NodeKind::PodSpec)
        .into_iter()
        .filter_map(|node| {
            let spec = node.object.pod_spec()?;
            Some((
                node.id,
                node.namespace().to_string(),
                spec.service_account().to_string(),
            ))
        })
        .collect();

    refs.into_iter()
        .map(|(spec, namespace, name)| {
            (spec, find_or_create_synthetic_service_account_node(graph, &namespace, &name))
        })
        .collect()
}
