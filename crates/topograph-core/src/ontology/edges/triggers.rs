//! Image sources of pod-template controllers.
//!
//! Image stream tags that trigger a rollout get a `TriggersDeployment` edge to
//! the controller. Containers that no trigger covers pull their image by
//! reference; that image becomes a repository node with a `UsedInDeployment`
//! edge.

use std::collections::BTreeSet;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::controller_ids;
use crate::graph::{EdgeKind, Graph, NodeId, NodeKind, NodeObject};
use crate::objects::{split_image_stream_tag, Container, ImageReference, ObjectReference, PodSpec};
use crate::ontology::nodes::{ensure_docker_repository_node, find_or_create_synthetic_image_stream_tag_node};

/// Annotation carrying a JSON list of image triggers on any pod-template controller.
pub const TRIGGERS_ANNOTATION: &str = "image.openshift.io/triggers";

/// Field paths accepted by annotation triggers.
const FIELD_PATH_PATTERN: &str =
    r#"^spec\.template\.spec\.(containers|initContainers)\[(?:\?\(@\.name=["']([^"']+)["']\)|(\d+))\]\.image$"#;

/// One entry of the trigger annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldTrigger {
    pub from: ObjectReference,
    #[serde(default)]
    pub field_path: String,
    #[serde(default)]
    pub paused: bool,
}

/// Decodes the trigger annotation value.
pub fn parse_trigger_annotation(value: &str) -> Result<Vec<ObjectFieldTrigger>, serde_json::Error> {
    serde_json::from_str(value)
}

/// Finds the container a trigger field path points at.
pub fn resolve_field_path<'a>(re: &Regex, spec: &'a PodSpec, path: &str) -> Option<&'a Container> {
    let caps = re.captures(path.trim())?;
    let containers = match caps.get(1).map(|m| m.as_str()) {
        Some("initContainers") => &spec.init_containers,
        _ => &spec.containers,
    };
    if let Some(name) = caps.get(2) {
        return containers.iter().find(|c| c.name == name.as_str());
    }
    let index: usize = caps.get(3)?.as_str().parse().ok()?;
    containers.get(index)
}

#[derive(Debug)]
struct TriggerPlan {
    controller: NodeId,
    /// `(namespace, stream, tag)` of every triggering tag.
    tags: BTreeSet<(String, String, String)>,
    images: Vec<ImageReference>,
}

/// Records trigger and image-usage edges for every pod-template controller.
pub fn add_all_trigger_edges(graph: &mut Graph) {
    for (from, to, kind) in resolve_trigger_sources(graph) {
        graph.add_edge(from, to, kind);
    }
}

/// Trigger and image-usage edges, with the tag and repository nodes they
/// name ensured.
pub(crate) fn resolve_trigger_sources(graph: &mut Graph) -> Vec<(NodeId, NodeId, EdgeKind)> {
    let mut edges = Vec::new();
    for plan in trigger_plans(graph) {
        for (namespace, stream, tag) in &plan.tags {
            let ist = find_or_create_synthetic_image_stream_tag_node(graph, namespace, stream, tag);
            edges.push((ist, plan.controller, EdgeKind::TriggersDeployment));
        }
        for image in &plan.images {
            let repo = ensure_docker_repository_node(graph, image);
            edges.push((repo, plan.controller, EdgeKind::UsedInDeployment));
        }
    }
    edges
}

fn trigger_plans(graph: &Graph) -> Vec<TriggerPlan> {
    let re = match Regex::new(FIELD_PATH_PATTERN) {
        Ok(r) => r,
        Err(e) => {
            warn!("Trigger field path pattern failed to compile: {}", e);
            return Vec::new();
        }
    };

    controller_ids(graph)
        .into_iter()
        .filter_map(|id| graph.node(id).map(|node| plan_controller(&re, id, &node.object)))
        .collect()
}

fn plan_controller(re: &Regex, id: NodeId, object: &NodeObject) -> TriggerPlan {
    let mut plan = TriggerPlan {
        controller: id,
        tags: BTreeSet::new(),
        images: Vec::new(),
    };
    let namespace = object.namespace().to_string();
    let spec = object.pod_spec();
    let mut triggered: BTreeSet<String> = BTreeSet::new();

    if let NodeObject::DeploymentConfig(dc) = object {
        for params in dc.image_change_triggers() {
            let from = &params.from;
            if from.name.is_empty() || !(from.kind.is_empty() || from.kind == "ImageStreamTag") {
                continue;
            }
            let (stream, tag, _) = split_image_stream_tag(&from.name);
            plan.tags.insert((
                from.namespace_or(&namespace).to_string(),
                stream.to_string(),
                tag.to_string(),
            ));
            triggered.extend(params.container_names.iter().cloned());
        }
    }

    let annotation = object
        .metadata()
        .and_then(|meta| meta.annotation(TRIGGERS_ANNOTATION));
    if let (Some(value), Some(spec)) = (annotation, spec) {
        match parse_trigger_annotation(value) {
            Ok(triggers) => {
                for trigger in triggers {
                    if trigger.from.kind != "ImageStreamTag" || trigger.from.name.is_empty() {
                        continue;
                    }
                    let Some(container) = resolve_field_path(re, spec, &trigger.field_path) else {
                        debug!(
                            "Trigger on {} names no container: {:?}",
                            object.name(),
                            trigger.field_path
                        );
                        continue;
                    };
                    let (stream, tag, _) = split_image_stream_tag(&trigger.from.name);
                    plan.tags.insert((
                        trigger.from.namespace_or(&namespace).to_string(),
                        stream.to_string(),
                        tag.to_string(),
                    ));
                    triggered.insert(container.name.clone());
                }
            }
            Err(e) => {
                debug!("Ignoring malformed trigger annotation on {}: {}", object.name(), e);
            }
        }
    }

    let pulls_images = matches!(
        object.kind(),
        NodeKind::DeploymentConfig | NodeKind::Deployment | NodeKind::StatefulSet | NodeKind::DaemonSet
    );
    if let (true, Some(spec)) = (pulls_images, spec) {
        for container in spec.containers.iter().chain(spec.init_containers.iter()) {
            if triggered.contains(&container.name) {
                continue;
            }
            if let Some(reference) = ImageReference::parse(&container.image) {
                plan.images.push(reference);
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> PodSpec {
        PodSpec {
            containers: vec![Container::new("web", "nginx"), Container::new("sidecar", "envoy")],
            init_containers: vec![Container::new("migrate", "flyway")],
            ..PodSpec::default()
        }
    }

    #[test]
    fn test_resolve_field_path_by_name_and_index() {
        let re = Regex::new(FIELD_PATH_PATTERN).unwrap();
        let spec = spec();

        let by_name = resolve_field_path(&re, &spec, r#"spec.template.spec.containers[?(@.name="sidecar")].image"#);
        assert_eq!(by_name.map(|c| c.name.as_str()), Some("sidecar"));

        let by_index = resolve_field_path(&re, &spec, "spec.template.spec.containers[0].image");
        assert_eq!(by_index.map(|c| c.name.as_str()), Some("web"));

        let init = resolve_field_path(&re, &spec, r#"spec.template.spec.initContainers[?(@.name="migrate")].image"#);
        assert_eq!(init.map(|c| c.name.as_str()), Some("migrate"));

        assert!(resolve_field_path(&re, &spec, "spec.template.spec.containers[5].image").is_none());
        assert!(resolve_field_path(&re, &spec, "spec.containers[0].image").is_none());
    }

    #[test]
    fn test_parse_trigger_annotation() {
        let value = r#"[{"from":{"kind":"ImageStreamTag","name":"app:v1"},"fieldPath":"spec.template.spec.containers[?(@.name=\"web\")].image"}]"#;
        let triggers = parse_trigger_annotation(value).unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].from.name, "app:v1");
        assert!(!triggers[0].paused);

        assert!(parse_trigger_annotation("not json").is_err());
    }
}
