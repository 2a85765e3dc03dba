use super::{Node, NodeObject};

/// Produces the resource names used in marker messages and suggestions.
pub trait Namer {
    fn resource_name(&self, node: &Node) -> String;
}

/// Names nodes `kind/name`, adding `[namespace]` for nodes outside the
/// current namespace.
///
/// Parts are named after the object that owns them.
#[derive(Debug, Clone, Default)]
pub struct NamespacedNamer {
    pub current_namespace: String,
}

impl NamespacedNamer {
    pub fn new(current_namespace: impl Into<String>) -> Self {
        Self {
            current_namespace: current_namespace.into(),
        }
    }
}

impl Namer for NamespacedNamer {
    fn resource_name(&self, node: &Node) -> String {
        let prefix = match &node.object {
            NodeObject::DockerRepository(reference) => return reference.to_string(),
            NodeObject::PodSpec(p) => p.owner_kind.short_name(),
            NodeObject::PodTemplateSpec(p) => p.owner_kind.short_name(),
            NodeObject::ReplicationControllerSpec(p) => p.owner_kind.short_name(),
            NodeObject::ReplicaSetSpec(p) => p.owner_kind.short_name(),
            NodeObject::StatefulSetSpec(p) => p.owner_kind.short_name(),
            NodeObject::DaemonSetSpec(p) => p.owner_kind.short_name(),
            NodeObject::DeploymentSpec(p) => p.owner_kind.short_name(),
            NodeObject::DeploymentConfigSpec(p) => p.owner_kind.short_name(),
            _ => node.kind().short_name(),
        };

        let namespace = node.namespace();
        if namespace.is_empty() || namespace == self.current_namespace {
            format!("{}/{}", prefix, node.name())
        } else {
            format!("{}/{}[{}]", prefix, node.name(), namespace)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, NodeKind, Part, UniqueName};
    use crate::objects::{DeploymentConfig, ObjectMeta, PodSpec};

    #[test]
    fn test_resource_name_namespacing() {
        let mut graph = Graph::new();
        let local = graph.ensure_unique(UniqueName::of(NodeKind::DeploymentConfig, "app", "web"), || {
            NodeObject::DeploymentConfig(DeploymentConfig {
                metadata: ObjectMeta::named("app", "web"),
                ..DeploymentConfig::default()
            })
        });
        let remote = graph.ensure_unique(UniqueName::of(NodeKind::DeploymentConfig, "other", "db"), || {
            NodeObject::DeploymentConfig(DeploymentConfig {
                metadata: ObjectMeta::named("other", "db"),
                ..DeploymentConfig::default()
            })
        });

        let namer = NamespacedNamer::new("app");
        assert_eq!(namer.resource_name(graph.node(local).unwrap()), "dc/web");
        assert_eq!(namer.resource_name(graph.node(remote).unwrap()), "dc/db[other]");
    }

    #[test]
    fn test_parts_named_after_owner() {
        let mut graph = Graph::new();
        let owner = UniqueName::of(NodeKind::DeploymentConfig, "app", "web");
        let id = graph.ensure_unique(UniqueName::part_of(NodeKind::PodSpec, &owner), || {
            NodeObject::PodSpec(Part {
                namespace: "app".into(),
                owner_kind: NodeKind::DeploymentConfig,
                owner_name: "web".into(),
                spec: PodSpec::default(),
            })
        });
        let namer = NamespacedNamer::new("app");
        assert_eq!(namer.resource_name(graph.node(id).unwrap()), "dc/web");
    }
}
