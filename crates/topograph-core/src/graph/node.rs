use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::kinds::NodeKind;
use crate::objects::{
    Build, BuildConfig, DaemonSet, DaemonSetSpec, Deployment, DeploymentConfig, DeploymentConfigSpec,
    DeploymentSpec, HorizontalPodAutoscaler, ImageReference, ImageStream, ImageStreamTag, ObjectMeta,
    PersistentVolumeClaim, Pod, PodSpec, PodTemplateSpec, ReplicaSet, ReplicaSetSpec, ReplicationController,
    ReplicationControllerSpec, Route, Secret, Service, ServiceAccount, StatefulSet, StatefulSetSpec,
};

/// Dense node identifier, assigned in insertion order starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub(crate) fn index(self) -> NodeIndex {
        NodeIndex::new(self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity key of a node.
///
/// Top-level objects are named `Kind|namespace/name`. Contained parts are
/// named by prefixing their kind to the owner's name, which yields an
/// owner chain such as
/// `PodSpec|PodTemplateSpec|ReplicationControllerSpec|ReplicationController|ns/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueName(String);

impl UniqueName {
    pub fn of(kind: NodeKind, namespace: &str, name: &str) -> Self {
        Self(format!("{}|{}/{}", kind.as_str(), namespace, name))
    }

    pub fn part_of(kind: NodeKind, owner: &UniqueName) -> Self {
        Self(format!("{}|{}", kind.as_str(), owner.0))
    }

    /// Name for nodes keyed by something other than a namespaced object.
    pub fn raw(kind: NodeKind, key: &str) -> Self {
        Self(format!("{}|{}", kind.as_str(), key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of a workload that gets its own node: a controller spec, pod
/// template or pod spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part<T> {
    pub namespace: String,
    /// Kind of the top-level object this part belongs to.
    pub owner_kind: NodeKind,
    /// Name of the top-level object this part belongs to.
    pub owner_name: String,
    pub spec: T,
}

/// The object wrapped by a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum NodeObject {
    Pod(Pod),
    ReplicationController(ReplicationController),
    ReplicaSet(ReplicaSet),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Deployment(Deployment),
    DeploymentConfig(DeploymentConfig),

    PodSpec(Part<PodSpec>),
    PodTemplateSpec(Part<PodTemplateSpec>),
    ReplicationControllerSpec(Part<ReplicationControllerSpec>),
    ReplicaSetSpec(Part<ReplicaSetSpec>),
    StatefulSetSpec(Part<StatefulSetSpec>),
    DaemonSetSpec(Part<DaemonSetSpec>),
    DeploymentSpec(Part<DeploymentSpec>),
    DeploymentConfigSpec(Part<DeploymentConfigSpec>),

    Service(Service),
    Route(Route),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
    ServiceAccount(ServiceAccount),
    Secret(Secret),
    PersistentVolumeClaim(PersistentVolumeClaim),

    Build(Build),
    BuildConfig(BuildConfig),
    ImageStream(ImageStream),
    ImageStreamTag(ImageStreamTag),
    /// An image pulled by reference rather than through an image stream.
    DockerRepository(ImageReference),
}

impl NodeObject {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Pod(_) => NodeKind::Pod,
            Self::ReplicationController(_) => NodeKind::ReplicationController,
            Self::ReplicaSet(_) => NodeKind::ReplicaSet,
            Self::StatefulSet(_) => NodeKind::StatefulSet,
            Self::DaemonSet(_) => NodeKind::DaemonSet,
            Self::Deployment(_) => NodeKind::Deployment,
            Self::DeploymentConfig(_) => NodeKind::DeploymentConfig,
            Self::PodSpec(_) => NodeKind::PodSpec,
            Self::PodTemplateSpec(_) => NodeKind::PodTemplateSpec,
            Self::ReplicationControllerSpec(_) => NodeKind::ReplicationControllerSpec,
            Self::ReplicaSetSpec(_) => NodeKind::ReplicaSetSpec,
            Self::StatefulSetSpec(_) => NodeKind::StatefulSetSpec,
            Self::DaemonSetSpec(_) => NodeKind::DaemonSetSpec,
            Self::DeploymentSpec(_) => NodeKind::DeploymentSpec,
            Self::DeploymentConfigSpec(_) => NodeKind::DeploymentConfigSpec,
            Self::Service(_) => NodeKind::Service,
            Self::Route(_) => NodeKind::Route,
            Self::HorizontalPodAutoscaler(_) => NodeKind::HorizontalPodAutoscaler,
            Self::ServiceAccount(_) => NodeKind::ServiceAccount,
            Self::Secret(_) => NodeKind::Secret,
            Self::PersistentVolumeClaim(_) => NodeKind::PersistentVolumeClaim,
            Self::Build(_) => NodeKind::Build,
            Self::BuildConfig(_) => NodeKind::BuildConfig,
            Self::ImageStream(_) => NodeKind::ImageStream,
            Self::ImageStreamTag(_) => NodeKind::ImageStreamTag,
            Self::DockerRepository(_) => NodeKind::DockerRepository,
        }
    }

    /// Metadata of a top-level object. Parts and image references have none.
    pub fn metadata(&self) -> Option<&ObjectMeta> {
        let meta = match self {
            Self::Pod(o) => &o.metadata,
            Self::ReplicationController(o) => &o.metadata,
            Self::ReplicaSet(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::DaemonSet(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::DeploymentConfig(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Route(o) => &o.metadata,
            Self::HorizontalPodAutoscaler(o) => &o.metadata,
            Self::ServiceAccount(o) => &o.metadata,
            Self::Secret(o) => &o.metadata,
            Self::PersistentVolumeClaim(o) => &o.metadata,
            Self::Build(o) => &o.metadata,
            Self::BuildConfig(o) => &o.metadata,
            Self::ImageStream(o) => &o.metadata,
            Self::ImageStreamTag(o) => &o.metadata,
            _ => return None,
        };
        Some(meta)
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::PodSpec(p) => &p.namespace,
            Self::PodTemplateSpec(p) => &p.namespace,
            Self::ReplicationControllerSpec(p) => &p.namespace,
            Self::ReplicaSetSpec(p) => &p.namespace,
            Self::StatefulSetSpec(p) => &p.namespace,
            Self::DaemonSetSpec(p) => &p.namespace,
            Self::DeploymentSpec(p) => &p.namespace,
            Self::DeploymentConfigSpec(p) => &p.namespace,
            Self::DockerRepository(_) => "",
            other => other.metadata().map_or("", |m| m.namespace.as_str()),
        }
    }

    /// Object name. Parts report their owner's name.
    pub fn name(&self) -> String {
        match self {
            Self::PodSpec(p) => p.owner_name.clone(),
            Self::PodTemplateSpec(p) => p.owner_name.clone(),
            Self::ReplicationControllerSpec(p) => p.owner_name.clone(),
            Self::ReplicaSetSpec(p) => p.owner_name.clone(),
            Self::StatefulSetSpec(p) => p.owner_name.clone(),
            Self::DaemonSetSpec(p) => p.owner_name.clone(),
            Self::DeploymentSpec(p) => p.owner_name.clone(),
            Self::DeploymentConfigSpec(p) => p.owner_name.clone(),
            Self::DockerRepository(r) => r.to_string(),
            other => other.metadata().map(|m| m.name.clone()).unwrap_or_default(),
        }
    }

    /// Pod template of a template-owning controller, or the template itself.
    pub fn pod_template(&self) -> Option<&PodTemplateSpec> {
        match self {
            Self::ReplicationController(o) => o.spec.template.as_ref(),
            Self::ReplicaSet(o) => o.spec.template.as_ref(),
            Self::StatefulSet(o) => Some(&o.spec.template),
            Self::DaemonSet(o) => Some(&o.spec.template),
            Self::Deployment(o) => Some(&o.spec.template),
            Self::DeploymentConfig(o) => o.spec.template.as_ref(),
            Self::PodTemplateSpec(p) => Some(&p.spec),
            _ => None,
        }
    }

    /// Pod spec of a pod, a pod spec part, or a controller's template.
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Self::Pod(p) => Some(&p.spec),
            Self::PodSpec(p) => Some(&p.spec),
            other => other.pod_template().map(|t| &t.spec),
        }
    }

    pub fn as_pod(&self) -> Option<&Pod> {
        match self {
            Self::Pod(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_replication_controller(&self) -> Option<&ReplicationController> {
        match self {
            Self::ReplicationController(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_replica_set(&self) -> Option<&ReplicaSet> {
        match self {
            Self::ReplicaSet(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_deployment(&self) -> Option<&Deployment> {
        match self {
            Self::Deployment(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_deployment_config(&self) -> Option<&DeploymentConfig> {
        match self {
            Self::DeploymentConfig(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&Service> {
        match self {
            Self::Service(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_hpa(&self) -> Option<&HorizontalPodAutoscaler> {
        match self {
            Self::HorizontalPodAutoscaler(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_pvc(&self) -> Option<&PersistentVolumeClaim> {
        match self {
            Self::PersistentVolumeClaim(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_build(&self) -> Option<&Build> {
        match self {
            Self::Build(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_build_config(&self) -> Option<&BuildConfig> {
        match self {
            Self::BuildConfig(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_image_stream(&self) -> Option<&ImageStream> {
        match self {
            Self::ImageStream(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_image_stream_tag(&self) -> Option<&ImageStreamTag> {
        match self {
            Self::ImageStreamTag(o) => Some(o),
            _ => None,
        }
    }
}

/// A node of the topology graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub unique_name: UniqueName,
    /// False for placeholders standing in for referenced objects that were never seen.
    pub found: bool,
    pub object: NodeObject,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.object.kind()
    }

    pub fn namespace(&self) -> &str {
        self.object.namespace()
    }

    pub fn name(&self) -> String {
        self.object.name()
    }

    /// Human label used when describing a node, e.g. `ReplicationController ns/frontend-1`.
    pub fn label(&self) -> String {
        match &self.object {
            NodeObject::DockerRepository(r) => format!("{} {}", self.kind(), r),
            _ => format!("{} {}/{}", self.kind(), self.namespace(), self.name()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_chain() {
        let rc = UniqueName::of(NodeKind::ReplicationController, "ns", "name");
        let spec = UniqueName::part_of(NodeKind::ReplicationControllerSpec, &rc);
        let template = UniqueName::part_of(NodeKind::PodTemplateSpec, &spec);
        let pod_spec = UniqueName::part_of(NodeKind::PodSpec, &template);
        assert_eq!(
            pod_spec.as_str(),
            "PodSpec|PodTemplateSpec|ReplicationControllerSpec|ReplicationController|ns/name"
        );
    }

    #[test]
    fn test_part_reports_owner() {
        let object = NodeObject::PodSpec(Part {
            namespace: "ns".into(),
            owner_kind: NodeKind::DeploymentConfig,
            owner_name: "frontend".into(),
            spec: PodSpec::default(),
        });
        assert_eq!(object.kind(), NodeKind::PodSpec);
        assert_eq!(object.namespace(), "ns");
        assert_eq!(object.name(), "frontend");
        assert!(object.metadata().is_none());
        assert!(object.pod_spec().is_some());
    }
}
