use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, Node, NodeKind, Severity};

use super::{is_found, name_of, top_level_controllers, AnalysisContext};

/// Pod specs worth checking: those of top-level controllers and of pods no
/// controller manages. Specs of managed pods repeat their template's findings.
fn checked_pod_specs(graph: &Graph) -> Vec<(&Node, &Node)> {
    let mut owners: Vec<&Node> = top_level_controllers(graph);
    owners.extend(
        graph
            .nodes_by_kind(NodeKind::Pod)
            .into_iter()
            .filter(|pod| pod.found)
            .filter(|pod| {
                graph
                    .successor_nodes_by_edge_kind(pod.id, EdgeKind::ManagedByController)
                    .is_empty()
            }),
    );

    let mut specs = Vec::new();
    for owner in owners {
        let Some(spec) = graph
            .contained_of_kind(owner.id, NodeKind::PodSpec)
            .and_then(|id| graph.node(id))
        else {
            continue;
        };
        specs.push((owner, spec));
    }
    specs
}

/// Finds pod specs mounting secrets that do not exist.
pub fn find_missing_secrets(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for (owner, spec) in checked_pod_specs(graph) {
        for secret in graph.successors_of_kind(spec.id, EdgeKind::MountedSecret, NodeKind::Secret) {
            if is_found(graph, secret) {
                continue;
            }
            markers.push(
                Marker::new(
                    owner.id,
                    Severity::Warning,
                    MarkerKey::MissingSecret,
                    format!(
                        "{} is attempting to mount a missing secret {}",
                        namer.resource_name(owner),
                        name_of(graph, namer, secret)
                    ),
                )
                .with_related([secret]),
            );
        }
    }
    markers
}

/// Finds pod specs mounting secrets their service account does not allow.
///
/// Only checked when the service account exists and lists mountable secrets.
pub fn find_unmountable_secrets(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for (owner, spec) in checked_pod_specs(graph) {
        let Some(account) = graph
            .successors_of_kind(spec.id, EdgeKind::ReferencedServiceAccount, NodeKind::ServiceAccount)
            .into_iter()
            .find(|&sa| is_found(graph, sa))
        else {
            continue;
        };
        let mountable = graph.successors_of_kind(account, EdgeKind::MountableSecret, NodeKind::Secret);
        if mountable.is_empty() {
            continue;
        }

        for secret in graph.successors_of_kind(spec.id, EdgeKind::MountedSecret, NodeKind::Secret) {
            if mountable.contains(&secret) {
                continue;
            }
            markers.push(
                Marker::new(
                    owner.id,
                    Severity::Warning,
                    MarkerKey::UnmountableSecret,
                    format!(
                        "{} is attempting to mount a secret {} disallowed by {}",
                        namer.resource_name(owner),
                        name_of(graph, namer, secret),
                        name_of(graph, namer, account)
                    ),
                )
                .with_related([secret, account]),
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
    use crate::objects::{ObjectMeta, ObjectReference, Pod, Secret, SecretVolumeSource, ServiceAccount, Volume};

    fn pod_mounting(secrets: &[&str]) -> Pod {
        let mut pod = Pod {
            metadata: ObjectMeta::named("ns", "worker"),
            ..Pod::default()
        };
        for name in secrets {
            pod.spec.volumes.push(Volume {
                name: name.to_string(),
                secret: Some(SecretVolumeSource {
                    secret_name: name.to_string(),
                }),
                ..Volume::default()
            });
        }
        pod
    }

    fn secret(name: &str) -> Secret {
        Secret {
            metadata: ObjectMeta::named("ns", name),
            ..Secret::default()
        }
    }

    #[test]
    fn test_missing_secret() {
        let mut builder = TopologyBuilder::new();
        builder.add_pod(&pod_mounting(&["creds"])).unwrap();
        let graph = builder.build();

        let markers = find_missing_secrets(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].message, "pod/worker is attempting to mount a missing secret secret/creds");
    }

    #[test]
    fn test_unmountable_secret() {
        let mut builder = TopologyBuilder::new();
        builder.add_pod(&pod_mounting(&["creds", "tls"])).unwrap();
        builder.add_secret(&secret("creds")).unwrap();
        builder.add_secret(&secret("tls")).unwrap();
        builder
            .add_service_account(&ServiceAccount {
                metadata: ObjectMeta::named("ns", "default"),
                secrets: vec![ObjectReference::new("Secret", "", "creds")],
                ..ServiceAccount::default()
            })
            .unwrap();
        let graph = builder.build();

        assert!(find_missing_secrets(&graph, &namer(), &ctx()).is_empty());
        let markers = find_unmountable_secrets(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert!(markers[0].message.contains("secret/tls"));
        assert!(markers[0].message.ends_with("sa/default"));
    }
}
