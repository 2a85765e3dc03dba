use crate::graph::{EdgeKind, Graph, NodeId, NodeKind};
use crate::ontology::nodes::find_or_create_synthetic_image_stream_node;

/// Image stream tags -> the image stream they belong to.
pub fn add_all_image_stream_ref_edges(graph: &mut Graph) {
    for (tag, stream) in resolve_image_streams(graph) {
        graph.add_edge(tag, stream, EdgeKind::ReferencedImageStream);
    }
}

/// `(tag, stream)` pairs, with placeholders ensured for missing streams.
pub(crate) fn resolve_image_streams(graph: &mut Graph) -> Vec<(NodeId, NodeId)> {
    let refs: Vec<(NodeId, String, String)> = graph
        .nodes_by_kind(NodeKind::ImageStreamTag)
        .into_iter()
        .filter_map(|node| {
            let tag = node.object.as_image_stream_tag()?;
            let (stream, _) = tag.stream_and_tag();
            Some((node.id, node.namespace().to_string(), stream.to_string()))
        })
        .collect();

    refs.into_iter()
        .map(|(tag, namespace, stream)| (tag, find_or_create_synthetic_image_stream_node(graph, &namespace, &stream)))
        .collect()
}
