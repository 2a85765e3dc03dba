//! Loading objects into a topology graph.

use log::warn;

use crate::error::{Result, TopologyError};
use crate::graph::{Graph, NodeId};
use crate::objects::{
    Build, BuildConfig, DaemonSet, Deployment, DeploymentConfig, HorizontalPodAutoscaler, ImageStream,
    ImageStreamTag, Object, ObjectMeta, PersistentVolumeClaim, Pod, ReplicaSet, ReplicationController, Route,
    Secret, Service, ServiceAccount, StatefulSet,
};
use crate::ontology::{self, nodes};

/// Collects objects into a graph and derives the edges between them.
///
/// Objects are added with the `add_*` methods in any order; [`TopologyBuilder::build`]
/// then runs every edge pass.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    graph: Graph,
}

fn identify(kind: &str, meta: &ObjectMeta) -> Result<()> {
    if meta.name.trim().is_empty() {
        warn!("Rejecting {} without a name", kind);
        return Err(TopologyError::UnidentifiableObject {
            kind: kind.to_string(),
            reason: "metadata.name is empty".to_string(),
        });
    }
    Ok(())
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pod(&mut self, pod: &Pod) -> Result<NodeId> {
        identify("Pod", &pod.metadata)?;
        Ok(nodes::ensure_pod_node(&mut self.graph, pod))
    }

    pub fn add_replication_controller(&mut self, rc: &ReplicationController) -> Result<NodeId> {
        identify("ReplicationController", &rc.metadata)?;
        Ok(nodes::ensure_replication_controller_node(&mut self.graph, rc))
    }

    pub fn add_replica_set(&mut self, rs: &ReplicaSet) -> Result<NodeId> {
        identify("ReplicaSet", &rs.metadata)?;
        Ok(nodes::ensure_replica_set_node(&mut self.graph, rs))
    }

    pub fn add_stateful_set(&mut self, set: &StatefulSet) -> Result<NodeId> {
        identify("StatefulSet", &set.metadata)?;
        Ok(nodes::ensure_stateful_set_node(&mut self.graph, set))
    }

    pub fn add_daemon_set(&mut self, set: &DaemonSet) -> Result<NodeId> {
        identify("DaemonSet", &set.metadata)?;
        Ok(nodes::ensure_daemon_set_node(&mut self.graph, set))
    }

    pub fn add_deployment(&mut self, deployment: &Deployment) -> Result<NodeId> {
        identify("Deployment", &deployment.metadata)?;
        Ok(nodes::ensure_deployment_node(&mut self.graph, deployment))
    }

    pub fn add_deployment_config(&mut self, dc: &DeploymentConfig) -> Result<NodeId> {
        identify("DeploymentConfig", &dc.metadata)?;
        Ok(nodes::ensure_deployment_config_node(&mut self.graph, dc))
    }

    pub fn add_service(&mut self, service: &Service) -> Result<NodeId> {
        identify("Service", &service.metadata)?;
        Ok(nodes::ensure_service_node(&mut self.graph, service))
    }

    pub fn add_service_account(&mut self, account: &ServiceAccount) -> Result<NodeId> {
        identify("ServiceAccount", &account.metadata)?;
        Ok(nodes::ensure_service_account_node(&mut self.graph, account))
    }

    pub fn add_secret(&mut self, secret: &Secret) -> Result<NodeId> {
        identify("Secret", &secret.metadata)?;
        Ok(nodes::ensure_secret_node(&mut self.graph, secret))
    }

    pub fn add_persistent_volume_claim(&mut self, claim: &PersistentVolumeClaim) -> Result<NodeId> {
        identify("PersistentVolumeClaim", &claim.metadata)?;
        Ok(nodes::ensure_pvc_node(&mut self.graph, claim))
    }

    pub fn add_horizontal_pod_autoscaler(&mut self, hpa: &HorizontalPodAutoscaler) -> Result<NodeId> {
        identify("HorizontalPodAutoscaler", &hpa.metadata)?;
        Ok(nodes::ensure_hpa_node(&mut self.graph, hpa))
    }

    pub fn add_route(&mut self, route: &Route) -> Result<NodeId> {
        identify("Route", &route.metadata)?;
        Ok(nodes::ensure_route_node(&mut self.graph, route))
    }

    pub fn add_build(&mut self, build: &Build) -> Result<NodeId> {
        identify("Build", &build.metadata)?;
        Ok(nodes::ensure_build_node(&mut self.graph, build))
    }

    pub fn add_build_config(&mut self, config: &BuildConfig) -> Result<NodeId> {
        identify("BuildConfig", &config.metadata)?;
        Ok(nodes::ensure_build_config_node(&mut self.graph, config))
    }

    pub fn add_image_stream(&mut self, stream: &ImageStream) -> Result<NodeId> {
        identify("ImageStream", &stream.metadata)?;
        Ok(nodes::ensure_image_stream_node(&mut self.graph, stream))
    }

    pub fn add_image_stream_tag(&mut self, tag: &ImageStreamTag) -> Result<NodeId> {
        identify("ImageStreamTag", &tag.metadata)?;
        Ok(nodes::ensure_image_stream_tag_node(&mut self.graph, tag))
    }

    /// Adds any supported object.
    pub fn add_object(&mut self, object: &Object) -> Result<NodeId> {
        match object {
            Object::Pod(o) => self.add_pod(o),
            Object::ReplicationController(o) => self.add_replication_controller(o),
            Object::ReplicaSet(o) => self.add_replica_set(o),
            Object::StatefulSet(o) => self.add_stateful_set(o),
            Object::DaemonSet(o) => self.add_daemon_set(o),
            Object::Deployment(o) => self.add_deployment(o),
            Object::DeploymentConfig(o) => self.add_deployment_config(o),
            Object::Service(o) => self.add_service(o),
            Object::ServiceAccount(o) => self.add_service_account(o),
            Object::Secret(o) => self.add_secret(o),
            Object::PersistentVolumeClaim(o) => self.add_persistent_volume_claim(o),
            Object::HorizontalPodAutoscaler(o) => self.add_horizontal_pod_autoscaler(o),
            Object::Route(o) => self.add_route(o),
            Object::Build(o) => self.add_build(o),
            Object::BuildConfig(o) => self.add_build_config(o),
            Object::ImageStream(o) => self.add_image_stream(o),
            Object::ImageStreamTag(o) => self.add_image_stream_tag(o),
        }
    }

    /// Adds every object, skipping the ones that cannot be identified.
    ///
    /// Returns the number of rejected objects.
    pub fn add_objects<'a, I>(&mut self, objects: I) -> usize
    where
        I: IntoIterator<Item = &'a Object>,
    {
        objects
            .into_iter()
            .filter(|object| self.add_object(object).is_err())
            .count()
    }

    /// The graph as loaded so far, before edge passes.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Runs every edge pass and returns the finished graph.
    pub fn build(mut self) -> Graph {
        ontology::add_all_edges(&mut self.graph);
        self.graph
    }
}

/// Builds a graph from a list of objects in one call.
pub fn build_graph<'a, I>(objects: I) -> Graph
where
    I: IntoIterator<Item = &'a Object>,
{
    let mut builder = TopologyBuilder::new();
    builder.add_objects(objects);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn test_rejects_nameless_objects() {
        let mut builder = TopologyBuilder::new();
        let err = builder.add_service(&Service::default()).unwrap_err();
        assert!(matches!(err, TopologyError::UnidentifiableObject { .. }));
        assert_eq!(builder.graph().node_count(), 0);
    }

    #[test]
    fn test_add_objects_counts_rejections() {
        let objects = vec![
            Object::Service(Service {
                metadata: ObjectMeta::named("ns", "web"),
                ..Service::default()
            }),
            Object::Secret(Secret::default()),
        ];
        let mut builder = TopologyBuilder::new();
        assert_eq!(builder.add_objects(&objects), 1);
        let graph = builder.build();
        assert_eq!(graph.nodes_by_kind(NodeKind::Service).len(), 1);
        assert!(graph.nodes_by_kind(NodeKind::Secret).is_empty());
    }
}
