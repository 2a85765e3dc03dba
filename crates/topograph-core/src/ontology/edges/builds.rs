//! Build configs, the images they consume and produce, and their builds.

use log::debug;

use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, UniqueName};
use crate::objects::ObjectReference;
use crate::ontology::nodes::ensure_image_source_node;

#[derive(Debug)]
struct BuildConfigRefs {
    config: NodeId,
    namespace: String,
    output: Option<ObjectReference>,
    base: Option<ObjectReference>,
    triggers: Vec<ObjectReference>,
}

/// Records `BuildOutput`, `BuildInputImage`, `BuildTriggerImage` and `Build`
/// edges.
pub fn add_all_build_edges(graph: &mut Graph) {
    for (from, to, kind) in resolve_build_images(graph) {
        graph.add_edge(from, to, kind);
    }
    add_all_build_config_build_edges(graph);
}

/// Image edges of every build config, with the image nodes they name ensured.
pub(crate) fn resolve_build_images(graph: &mut Graph) -> Vec<(NodeId, NodeId, EdgeKind)> {
    let configs: Vec<BuildConfigRefs> = graph
        .nodes_by_kind(NodeKind::BuildConfig)
        .into_iter()
        .filter_map(|node| {
            let bc = node.object.as_build_config()?;
            Some(BuildConfigRefs {
                config: node.id,
                namespace: node.namespace().to_string(),
                output: bc.spec.output.to.clone(),
                base: bc.spec.strategy.base_image().cloned(),
                triggers: bc.trigger_images().into_iter().cloned().collect(),
            })
        })
        .collect();

    let mut edges = Vec::new();
    for refs in configs {
        if let Some(output) = &refs.output {
            if let Some(image) = ensure_image_source_node(graph, output, &refs.namespace) {
                edges.push((refs.config, image, EdgeKind::BuildOutput));
            }
        }
        if let Some(base) = &refs.base {
            if let Some(image) = ensure_image_source_node(graph, base, &refs.namespace) {
                edges.push((image, refs.config, EdgeKind::BuildInputImage));
            }
        }
        for trigger in &refs.triggers {
            if let Some(image) = ensure_image_source_node(graph, trigger, &refs.namespace) {
                edges.push((image, refs.config, EdgeKind::BuildTriggerImage));
            }
        }
    }
    edges
}

/// Build configs -> the builds they started.
fn add_all_build_config_build_edges(graph: &mut Graph) {
    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for node in graph.nodes_by_kind(NodeKind::Build) {
        let Some(build) = node.object.as_build() else {
            continue;
        };
        let Some(config_name) = build.build_config_name() else {
            continue;
        };
        let unique = UniqueName::of(NodeKind::BuildConfig, node.namespace(), config_name);
        match graph.find(&unique) {
            Some(config) => pairs.push((config, node.id)),
            None => debug!("Build {} names unknown build config {}", node.name(), config_name),
        }
    }

    for (config, build) in pairs {
        graph.add_edge(config, build, EdgeKind::Build);
    }
}
