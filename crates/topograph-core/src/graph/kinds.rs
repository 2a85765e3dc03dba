use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag identifying what a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // === Workloads ===
    Pod,
    ReplicationController,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Deployment,
    DeploymentConfig,

    // === Contained parts ===
    PodSpec,
    PodTemplateSpec,
    ReplicationControllerSpec,
    ReplicaSetSpec,
    StatefulSetSpec,
    DaemonSetSpec,
    DeploymentSpec,
    DeploymentConfigSpec,

    // === Network ===
    Service,
    Route,
    HorizontalPodAutoscaler,

    // === Config ===
    ServiceAccount,
    Secret,
    PersistentVolumeClaim,

    // === Images ===
    Build,
    BuildConfig,
    ImageStream,
    ImageStreamTag,
    DockerRepository,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::ReplicationController => "ReplicationController",
            Self::ReplicaSet => "ReplicaSet",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::Deployment => "Deployment",
            Self::DeploymentConfig => "DeploymentConfig",
            Self::PodSpec => "PodSpec",
            Self::PodTemplateSpec => "PodTemplateSpec",
            Self::ReplicationControllerSpec => "ReplicationControllerSpec",
            Self::ReplicaSetSpec => "ReplicaSetSpec",
            Self::StatefulSetSpec => "StatefulSetSpec",
            Self::DaemonSetSpec => "DaemonSetSpec",
            Self::DeploymentSpec => "DeploymentSpec",
            Self::DeploymentConfigSpec => "DeploymentConfigSpec",
            Self::Service => "Service",
            Self::Route => "Route",
            Self::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            Self::ServiceAccount => "ServiceAccount",
            Self::Secret => "Secret",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::Build => "Build",
            Self::BuildConfig => "BuildConfig",
            Self::ImageStream => "ImageStream",
            Self::ImageStreamTag => "ImageStreamTag",
            Self::DockerRepository => "DockerImageRepository",
        }
    }

    /// Short resource prefix used in human-facing names, e.g. `dc` or `svc`.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::ReplicationController => "rc",
            Self::ReplicaSet => "rs",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
            Self::Deployment => "deployment",
            Self::DeploymentConfig => "dc",
            Self::Service => "svc",
            Self::Route => "route",
            Self::HorizontalPodAutoscaler => "hpa",
            Self::ServiceAccount => "sa",
            Self::Secret => "secret",
            Self::PersistentVolumeClaim => "pvc",
            Self::Build => "build",
            Self::BuildConfig => "bc",
            Self::ImageStream => "is",
            Self::ImageStreamTag => "istag",
            Self::DockerRepository => "image",
            Self::PodSpec
            | Self::PodTemplateSpec
            | Self::ReplicationControllerSpec
            | Self::ReplicaSetSpec
            | Self::StatefulSetSpec
            | Self::DaemonSetSpec
            | Self::DeploymentSpec
            | Self::DeploymentConfigSpec => "part",
        }
    }

    /// Controllers that own a pod template.
    pub fn is_pod_template_controller(self) -> bool {
        matches!(
            self,
            Self::ReplicationController
                | Self::ReplicaSet
                | Self::StatefulSet
                | Self::DaemonSet
                | Self::Deployment
                | Self::DeploymentConfig
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship recorded on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    // === Structural ===
    /// Owner contains a spec, template or pod spec
    Contains,

    // === Exposure ===
    /// Pod or pod template -> service selecting it
    ExposedThroughService,
    /// Route -> service it forwards to
    ExposedThroughRoute,

    // === Management ===
    /// Pod -> controller, or replica -> deployment controller
    ManagedByController,
    /// Deployment controller -> replica it rolled out
    Deployment,
    /// Autoscaler -> scale target
    Scaling,

    // === Images ===
    /// Image stream tag -> controller it triggers
    TriggersDeployment,
    /// Plain image repository -> controller running it
    UsedInDeployment,
    /// Image stream tag -> its image stream
    ReferencedImageStream,
    /// Build config -> image it pushes
    BuildOutput,
    /// Base image -> build config building from it
    BuildInputImage,
    /// Watched image -> build config it triggers
    BuildTriggerImage,
    /// Build config -> build it started
    Build,

    // === Configuration ===
    /// Pod spec -> secret mounted as a volume
    MountedSecret,
    /// Service account -> secret it may mount
    MountableSecret,
    /// Pod spec -> service account it runs as
    ReferencedServiceAccount,
    /// Controller -> claim mounted by its template
    VolumeClaim,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "Contains",
            Self::ExposedThroughService => "ExposedThroughService",
            Self::ExposedThroughRoute => "ExposedThroughRoute",
            Self::ManagedByController => "ManagedByController",
            Self::Deployment => "Deployment",
            Self::Scaling => "Scaling",
            Self::TriggersDeployment => "TriggersDeployment",
            Self::UsedInDeployment => "UsedInDeployment",
            Self::ReferencedImageStream => "ReferencedImageStream",
            Self::BuildOutput => "BuildOutput",
            Self::BuildInputImage => "BuildInputImage",
            Self::BuildTriggerImage => "BuildTriggerImage",
            Self::Build => "Build",
            Self::MountedSecret => "MountedSecret",
            Self::MountableSecret => "MountableSecret",
            Self::ReferencedServiceAccount => "ReferencedServiceAccount",
            Self::VolumeClaim => "VolumeClaim",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
