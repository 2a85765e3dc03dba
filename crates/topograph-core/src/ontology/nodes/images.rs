//! Builds, build configs, image streams, image stream tags and plain image
//! repositories.

use log::debug;

use crate::graph::{Graph, NodeId, NodeKind, NodeObject, UniqueName};
use crate::objects::{
    join_image_stream_tag, split_image_stream_tag, Build, BuildConfig, ImageReference, ImageStream,
    ImageStreamTag, ObjectMeta, ObjectReference,
};

pub fn ensure_build_config_node(graph: &mut Graph, config: &BuildConfig) -> NodeId {
    let meta = &config.metadata;
    let name = UniqueName::of(NodeKind::BuildConfig, &meta.namespace, &meta.name);
    graph.ensure_found(name, || NodeObject::BuildConfig(config.clone()))
}

pub fn ensure_build_node(graph: &mut Graph, build: &Build) -> NodeId {
    let meta = &build.metadata;
    let name = UniqueName::of(NodeKind::Build, &meta.namespace, &meta.name);
    graph.ensure_found(name, || NodeObject::Build(build.clone()))
}

pub fn ensure_image_stream_node(graph: &mut Graph, stream: &ImageStream) -> NodeId {
    let meta = &stream.metadata;
    let name = UniqueName::of(NodeKind::ImageStream, &meta.namespace, &meta.name);
    graph.ensure_found(name, || NodeObject::ImageStream(stream.clone()))
}

pub fn find_or_create_synthetic_image_stream_node(graph: &mut Graph, namespace: &str, name: &str) -> NodeId {
    graph.ensure_synthetic(UniqueName::of(NodeKind::ImageStream, namespace, name), || {
        NodeObject::ImageStream(ImageStream {
            metadata: ObjectMeta::named(namespace, name),
            ..ImageStream::default()
        })
    })
}

/// Ensures a tag object. Names without a tag get the default tag.
pub fn ensure_image_stream_tag_node(graph: &mut Graph, tag: &ImageStreamTag) -> NodeId {
    let meta = &tag.metadata;
    let (stream, tag_name, _) = split_image_stream_tag(&meta.name);
    let full = join_image_stream_tag(stream, tag_name);
    let name = UniqueName::of(NodeKind::ImageStreamTag, &meta.namespace, &full);
    graph.ensure_found(name, || {
        let mut tag = tag.clone();
        tag.metadata.name = full.clone();
        NodeObject::ImageStreamTag(tag)
    })
}

pub fn find_or_create_synthetic_image_stream_tag_node(
    graph: &mut Graph,
    namespace: &str,
    stream: &str,
    tag: &str,
) -> NodeId {
    let full = join_image_stream_tag(stream, tag);
    graph.ensure_synthetic(UniqueName::of(NodeKind::ImageStreamTag, namespace, &full), || {
        NodeObject::ImageStreamTag(ImageStreamTag::named(namespace, stream, tag))
    })
}

/// Ensures the node for a plain image reference, keyed with the default tag applied.
pub fn ensure_docker_repository_node(graph: &mut Graph, reference: &ImageReference) -> NodeId {
    let reference = reference.with_default_tag();
    let name = UniqueName::raw(NodeKind::DockerRepository, &reference.to_string());
    graph.ensure_unique(name, || NodeObject::DockerRepository(reference))
}

/// Resolves an image reference as used by triggers and build strategies.
///
/// `ImageStreamTag` and `ImageStream` references become tag nodes (namespace
/// defaulting to `namespace`); `DockerImage` references become repository
/// nodes. Anything else is skipped.
pub fn ensure_image_source_node(graph: &mut Graph, from: &ObjectReference, namespace: &str) -> Option<NodeId> {
    if from.name.is_empty() {
        return None;
    }
    match from.kind.as_str() {
        "ImageStreamTag" | "ImageStream" => {
            let (stream, tag, _) = split_image_stream_tag(&from.name);
            let ns = from.namespace_or(namespace);
            Some(find_or_create_synthetic_image_stream_tag_node(graph, ns, stream, tag))
        }
        "DockerImage" => match ImageReference::parse(&from.name) {
            Some(reference) => Some(ensure_docker_repository_node(graph, &reference)),
            None => {
                debug!("Skipping unparsable image reference {:?}", from.name);
                None
            }
        },
        other => {
            debug!("Skipping image reference of kind {:?} to {}", other, from.name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_defaulting() {
        let mut graph = Graph::new();
        let a = find_or_create_synthetic_image_stream_tag_node(&mut graph, "ns", "app", "");
        let b = find_or_create_synthetic_image_stream_tag_node(&mut graph, "ns", "app", "latest");
        assert_eq!(a, b);
        assert_eq!(
            graph.node(a).unwrap().unique_name.as_str(),
            "ImageStreamTag|ns/app:latest"
        );
    }

    #[test]
    fn test_docker_repository_keyed_with_default_tag() {
        let mut graph = Graph::new();
        let a = ensure_docker_repository_node(&mut graph, &ImageReference::parse("nginx").unwrap());
        let b = ensure_docker_repository_node(&mut graph, &ImageReference::parse("nginx:latest").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_image_source_kinds() {
        let mut graph = Graph::new();
        let ist = ensure_image_source_node(&mut graph, &ObjectReference::new("ImageStreamTag", "", "app:v1"), "ns");
        assert_eq!(graph.kind_of(ist.unwrap()), Some(NodeKind::ImageStreamTag));
        assert_eq!(graph.node(ist.unwrap()).unwrap().namespace(), "ns");

        let docker = ensure_image_source_node(&mut graph, &ObjectReference::new("DockerImage", "", "redis:7"), "ns");
        assert_eq!(graph.kind_of(docker.unwrap()), Some(NodeKind::DockerRepository));

        assert!(ensure_image_source_node(&mut graph, &ObjectReference::new("Secret", "", "x"), "ns").is_none());
    }
}
