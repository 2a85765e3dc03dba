//! Decoded orchestration objects.
//!
//! These are plain data types mirroring the subset of the platform's API
//! that the topology graph needs. They are produced by whatever decodes the
//! cluster snapshot; the graph engine never talks to a cluster itself.
//!
//! - [`meta`] - metadata, owner references and label selectors
//! - [`workload`] - pods, replication controllers, services, secrets, claims
//! - [`apps`] - replica sets, stateful sets, daemon sets, deployments, deployment configs
//! - [`autoscaling`], [`route`], [`build`], [`image`]

pub mod apps;
pub mod autoscaling;
pub mod build;
pub mod image;
pub mod meta;
pub mod route;
pub mod workload;

pub use self::apps::*;
pub use self::autoscaling::*;
pub use self::build::*;
pub use self::image::*;
pub use self::meta::*;
pub use self::route::*;
pub use self::workload::*;

use serde::{Deserialize, Serialize};

/// Any object the topology builder accepts, tagged by its `kind` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Object {
    Pod(Pod),
    ReplicationController(ReplicationController),
    ReplicaSet(ReplicaSet),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Deployment(Deployment),
    DeploymentConfig(DeploymentConfig),
    Service(Service),
    ServiceAccount(ServiceAccount),
    Secret(Secret),
    PersistentVolumeClaim(PersistentVolumeClaim),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
    Route(Route),
    Build(Build),
    BuildConfig(BuildConfig),
    ImageStream(ImageStream),
    ImageStreamTag(ImageStreamTag),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pod(_) => "Pod",
            Self::ReplicationController(_) => "ReplicationController",
            Self::ReplicaSet(_) => "ReplicaSet",
            Self::StatefulSet(_) => "StatefulSet",
            Self::DaemonSet(_) => "DaemonSet",
            Self::Deployment(_) => "Deployment",
            Self::DeploymentConfig(_) => "DeploymentConfig",
            Self::Service(_) => "Service",
            Self::ServiceAccount(_) => "ServiceAccount",
            Self::Secret(_) => "Secret",
            Self::PersistentVolumeClaim(_) => "PersistentVolumeClaim",
            Self::HorizontalPodAutoscaler(_) => "HorizontalPodAutoscaler",
            Self::Route(_) => "Route",
            Self::Build(_) => "Build",
            Self::BuildConfig(_) => "BuildConfig",
            Self::ImageStream(_) => "ImageStream",
            Self::ImageStreamTag(_) => "ImageStreamTag",
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Pod(o) => &o.metadata,
            Self::ReplicationController(o) => &o.metadata,
            Self::ReplicaSet(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::DaemonSet(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::DeploymentConfig(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::ServiceAccount(o) => &o.metadata,
            Self::Secret(o) => &o.metadata,
            Self::PersistentVolumeClaim(o) => &o.metadata,
            Self::HorizontalPodAutoscaler(o) => &o.metadata,
            Self::Route(o) => &o.metadata,
            Self::Build(o) => &o.metadata,
            Self::BuildConfig(o) => &o.metadata,
            Self::ImageStream(o) => &o.metadata,
            Self::ImageStreamTag(o) => &o.metadata,
        }
    }
}
