use crate::graph::{EdgeKind, Graph, Marker, MarkerKey, Namer, NodeId, NodeKind, Severity};
use crate::objects::ImageStream;

use super::{found_nodes, is_found, name_of, AnalysisContext};

/// Controller kinds whose rollouts image triggers can start.
const TRIGGERED_KINDS: [NodeKind; 4] = [
    NodeKind::DeploymentConfig,
    NodeKind::Deployment,
    NodeKind::StatefulSet,
    NodeKind::DaemonSet,
];

/// Whether `stream` has `tag`, either imported/pushed or declared.
fn stream_has_tag(stream: &ImageStream, tag: &str) -> bool {
    stream.status.tags.iter().any(|t| t.tag == tag) || stream.spec.tags.iter().any(|t| t.name == tag)
}

/// Finds controllers triggered by image stream tags that do not exist.
///
/// A tag pushed by a build config is not reported: the build will create it.
pub fn find_missing_trigger_images(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();

    for kind in TRIGGERED_KINDS {
        for controller in found_nodes(graph, kind) {
            let mut images = graph.predecessor_nodes_by_edge_kind(controller.id, EdgeKind::TriggersDeployment);
            images.extend(graph.predecessor_nodes_by_edge_kind(controller.id, EdgeKind::UsedInDeployment));
            images.sort();
            images.dedup();

            for image in images {
                if let Some(marker) = check_trigger_image(graph, namer, controller.id, image) {
                    markers.push(marker);
                }
            }
        }
    }
    markers
}

fn check_trigger_image(graph: &Graph, namer: &dyn Namer, controller: NodeId, image: NodeId) -> Option<Marker> {
    let node = graph.node(image)?;
    let tag_object = node.object.as_image_stream_tag()?;
    if node.found {
        return None;
    }
    if !graph
        .predecessors_of_kind(image, EdgeKind::BuildOutput, NodeKind::BuildConfig)
        .is_empty()
    {
        return None;
    }

    let controller_name = name_of(graph, namer, controller);
    let tag_name = namer.resource_name(node);
    let stream = graph
        .successors_of_kind(image, EdgeKind::ReferencedImageStream, NodeKind::ImageStream)
        .first()
        .copied();

    match stream.filter(|&s| is_found(graph, s)) {
        Some(stream_id) => {
            let (_, tag) = tag_object.stream_and_tag();
            let has_tag = graph
                .node(stream_id)
                .and_then(|n| n.object.as_image_stream())
                .is_some_and(|is| stream_has_tag(is, tag));
            if has_tag {
                return None;
            }
            let marker = Marker::new(
                controller,
                Severity::Warning,
                MarkerKey::MissingImageStreamTag,
                format!("{controller_name} will wait for {tag_name} to be created before it can roll out"),
            )
            .with_related([image, stream_id])
            .with_suggestion(format!(
                "Push an image to {tag_name} or tag an existing image into it."
            ));
            Some(marker)
        }
        None => {
            let stream_name = stream.map_or_else(|| tag_name.clone(), |s| name_of(graph, namer, s));
            let marker = Marker::new(
                controller,
                Severity::Error,
                MarkerKey::MissingImageStream,
                format!("{controller_name} is triggered by {tag_name}, but {stream_name} does not exist"),
            )
            .with_related(std::iter::once(image).chain(stream))
            .with_suggestion(format!("Create {stream_name} or change the trigger of {controller_name}."));
            Some(marker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, namer};
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::objects::{
        DeploymentConfig, DeploymentTriggerImageChangeParams, DeploymentTriggerPolicy, DeploymentTriggerType,
        ImageStream, NamedTagEventList, ObjectMeta, ObjectReference, PodTemplateSpec,
    };

    fn triggered_dc(tag: &str) -> DeploymentConfig {
        let mut dc = DeploymentConfig {
            metadata: ObjectMeta::named("ns", "web"),
            ..DeploymentConfig::default()
        };
        dc.spec.template = Some(PodTemplateSpec::default());
        dc.spec.triggers.push(DeploymentTriggerPolicy {
            trigger_type: DeploymentTriggerType::ImageChange,
            image_change_params: Some(DeploymentTriggerImageChangeParams {
                automatic: true,
                container_names: vec!["web".to_string()],
                from: ObjectReference::new("ImageStreamTag", "ns", tag),
                last_triggered_image: None,
            }),
        });
        dc
    }

    fn stream_with_tag(tag: &str) -> ImageStream {
        let mut stream = ImageStream {
            metadata: ObjectMeta::named("ns", "web"),
            ..ImageStream::default()
        };
        stream.status.tags.push(NamedTagEventList {
            tag: tag.to_string(),
            items: Vec::new(),
        });
        stream
    }

    #[test]
    fn test_missing_stream_is_error() {
        let mut builder = TopologyBuilder::new();
        builder.add_deployment_config(&triggered_dc("web:latest")).unwrap();
        let graph = builder.build();

        let markers = find_missing_trigger_images(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, MarkerKey::MissingImageStream);
        assert_eq!(markers[0].severity, Severity::Error);
    }

    #[test]
    fn test_missing_tag_is_warning() {
        let mut builder = TopologyBuilder::new();
        builder.add_deployment_config(&triggered_dc("web:v2")).unwrap();
        builder.add_image_stream(&stream_with_tag("latest")).unwrap();
        let graph = builder.build();

        let markers = find_missing_trigger_images(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, MarkerKey::MissingImageStreamTag);
        assert_eq!(markers[0].severity, Severity::Warning);
    }

    #[test]
    fn test_tag_listed_by_stream_is_fine() {
        let mut builder = TopologyBuilder::new();
        builder.add_deployment_config(&triggered_dc("web:latest")).unwrap();
        builder.add_image_stream(&stream_with_tag("latest")).unwrap();
        let graph = builder.build();

        assert!(find_missing_trigger_images(&graph, &namer(), &ctx()).is_empty());
    }
}
