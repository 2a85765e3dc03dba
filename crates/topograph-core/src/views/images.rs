//! Image pipelines: an image, the build config producing it and its builds.

use serde::Serialize;

use super::CoveredSet;
use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::Build;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePipeline {
    /// Image stream tag or repository the pipeline produces or consumes.
    pub image: Option<NodeId>,
    /// Image stream the tag belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_stream: Option<NodeId>,
    /// Whether pushes to the image can land: the stream exists and has a
    /// registry location. Plain repositories always resolve.
    pub destination_resolved: bool,
    /// Whether the tag is imported periodically from an external registry.
    pub scheduled_import: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_config: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_image: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_successful_build: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_unsuccessful_build: Option<NodeId>,
    /// Builds not yet finished, newest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub active_builds: Vec<NodeId>,
    pub claimed: CoveredSet,
}

/// Builds of a build config split by outcome, each list newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevantBuilds {
    pub last_successful: Option<NodeId>,
    pub last_unsuccessful: Option<NodeId>,
    /// Newest build that is no longer running, whatever its outcome.
    pub latest_finished: Option<NodeId>,
    pub active: Vec<NodeId>,
}

/// Orders the builds of `build_config` by creation time, newest first, and
/// picks the latest successful and unsuccessful ones.
pub fn relevant_builds(graph: &Graph, build_config: NodeId) -> RelevantBuilds {
    let mut builds: Vec<(NodeId, &Build)> = graph
        .successors_of_kind(build_config, EdgeKind::Build, NodeKind::Build)
        .into_iter()
        .filter_map(|id| Some((id, graph.node(id)?.object.as_build()?)))
        .collect();
    builds.sort_by(|(a_id, a), (b_id, b)| b.timestamp().cmp(&a.timestamp()).then(b_id.cmp(a_id)));

    let mut out = RelevantBuilds::default();
    for (id, build) in builds {
        let phase = build.status.phase;
        if phase.is_active() {
            out.active.push(id);
            continue;
        }
        out.latest_finished.get_or_insert(id);
        if phase.is_unsuccessful() {
            out.last_unsuccessful.get_or_insert(id);
        } else if out.last_successful.is_none() {
            out.last_successful = Some(id);
        }
    }
    out
}

impl ImagePipeline {
    fn empty() -> Self {
        Self {
            image: None,
            image_stream: None,
            destination_resolved: false,
            scheduled_import: false,
            build_config: None,
            base_image: None,
            last_successful_build: None,
            last_unsuccessful_build: None,
            active_builds: Vec::new(),
            claimed: CoveredSet::new(),
        }
    }

    /// Pipeline rooted at an image stream tag or repository.
    pub fn for_image(graph: &Graph, image: NodeId) -> (Self, CoveredSet) {
        let mut pipeline = Self::empty();
        let mut covered = CoveredSet::from([image]);
        pipeline.image = Some(image);

        match graph.node(image).map(|n| &n.object) {
            Some(NodeObject::ImageStreamTag(tag)) => {
                let stream = graph
                    .successors_of_kind(image, EdgeKind::ReferencedImageStream, NodeKind::ImageStream)
                    .first()
                    .copied();
                if let Some(stream_id) = stream {
                    covered.insert(stream_id);
                    pipeline.image_stream = Some(stream_id);
                    let stream_node = graph.node(stream_id);
                    if let Some(is) = stream_node.filter(|n| n.found).and_then(|n| n.object.as_image_stream()) {
                        pipeline.destination_resolved = !is.status.docker_image_repository.is_empty();
                        pipeline.scheduled_import = is.is_scheduled_import(tag.stream_and_tag().1);
                    }
                }
            }
            Some(NodeObject::DockerRepository(_)) => pipeline.destination_resolved = true,
            _ => {}
        }

        let producer = graph
            .predecessors_of_kind(image, EdgeKind::BuildOutput, NodeKind::BuildConfig)
            .first()
            .copied();
        if let Some(bc) = producer {
            pipeline.attach_build_config(graph, bc, &mut covered);
        }
        (pipeline, covered)
    }

    /// Pipeline for a build config, rooted at its output image when it has one.
    pub fn for_build_config(graph: &Graph, build_config: NodeId) -> (Self, CoveredSet) {
        let output = graph
            .successor_nodes_by_edge_kind(build_config, EdgeKind::BuildOutput)
            .first()
            .copied();
        if let Some(image) = output {
            let (pipeline, covered) = Self::for_image(graph, image);
            if pipeline.build_config == Some(build_config) {
                return (pipeline, covered);
            }
        }

        let mut pipeline = Self::empty();
        let mut covered = CoveredSet::new();
        pipeline.attach_build_config(graph, build_config, &mut covered);
        (pipeline, covered)
    }

    fn attach_build_config(&mut self, graph: &Graph, bc: NodeId, covered: &mut CoveredSet) {
        self.build_config = Some(bc);
        covered.insert(bc);

        self.base_image = graph
            .predecessor_nodes_by_edge_kind(bc, EdgeKind::BuildInputImage)
            .first()
            .copied();
        covered.extend(self.base_image);

        let builds = relevant_builds(graph, bc);
        self.last_successful_build = builds.last_successful;
        self.last_unsuccessful_build = builds.last_unsuccessful;
        self.active_builds = builds.active;
        covered.extend(graph.successors_of_kind(bc, EdgeKind::Build, NodeKind::Build));
    }
}
