use crate::graph::{edges_of_kind, nodes_of_kind, EdgeKind, Graph, Marker, MarkerKey, Namer, NodeKind, Severity};
use crate::views::relevant_builds;

use super::{found_nodes, is_found, name_of, AnalysisContext};

/// Finds build configs pushing to a tag whose image stream does not exist.
pub fn find_missing_output_image_streams(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for bc in found_nodes(graph, NodeKind::BuildConfig) {
        for tag in graph.successors_of_kind(bc.id, EdgeKind::BuildOutput, NodeKind::ImageStreamTag) {
            let Some(stream) = graph
                .successors_of_kind(tag, EdgeKind::ReferencedImageStream, NodeKind::ImageStream)
                .first()
                .copied()
            else {
                continue;
            };
            if is_found(graph, stream) {
                continue;
            }
            let stream_name = name_of(graph, namer, stream);
            markers.push(
                Marker::new(
                    bc.id,
                    Severity::Error,
                    MarkerKey::MissingOutputImageStream,
                    format!(
                        "{} is pushing to {}, but the image stream for that tag does not exist",
                        namer.resource_name(bc),
                        name_of(graph, namer, tag)
                    ),
                )
                .with_related([tag, stream])
                .with_suggestion(format!("Create {stream_name} before running the build.")),
            );
        }
    }
    markers
}

/// Finds build configs whose output feeds back into their own input.
///
/// One marker per cycle, on the lowest-numbered build config in it.
pub fn find_circular_builds(graph: &Graph, namer: &dyn Namer, _ctx: &AnalysisContext) -> Vec<Marker> {
    let image_kinds = [NodeKind::BuildConfig, NodeKind::ImageStreamTag, NodeKind::DockerRepository];
    let edge_kinds = [EdgeKind::BuildInputImage, EdgeKind::BuildOutput];
    let subgraph = graph.subgraph(nodes_of_kind(&image_kinds), edges_of_kind(&edge_kinds));

    let mut markers = Vec::new();
    for cycle in subgraph.cycles() {
        let Some(&first) = cycle
            .iter()
            .find(|&&id| graph.kind_of(id) == Some(NodeKind::BuildConfig))
        else {
            continue;
        };
        let names: Vec<String> = cycle.iter().map(|&id| name_of(graph, namer, id)).collect();
        let related: Vec<_> = cycle.iter().copied().filter(|&id| id != first).collect();
        markers.push(
            Marker::new(
                first,
                Severity::Warning,
                MarkerKey::CyclicBuildConfig,
                format!("Cycle detected in build configurations: {}", names.join(", ")),
            )
            .with_related(related),
        );
    }
    markers
}

/// Finds build configs whose most recently finished build failed.
pub fn find_failed_latest_builds(graph: &Graph, namer: &dyn Namer, ctx: &AnalysisContext) -> Vec<Marker> {
    let mut markers = Vec::new();
    for bc in found_nodes(graph, NodeKind::BuildConfig) {
        let builds = relevant_builds(graph, bc.id);
        let Some(latest) = builds.latest_finished else {
            continue;
        };
        if builds.last_unsuccessful != Some(latest) {
            continue;
        }
        let bc_name = namer.resource_name(bc);
        markers.push(
            Marker::new(
                bc.id,
                Severity::Error,
                MarkerKey::LatestBuildFailed,
                format!("{} has failed its latest build {}", bc_name, name_of(graph, namer, latest)),
            )
            .with_related([latest])
            .with_suggestion(format!("Inspect the build failure with: {} {}", ctx.config.logs_command, bc_name)),
        );
    }
    markers
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::super::test_support::{ctx, namer};
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::objects::{
        Build, BuildConfig, BuildPhase, ImageStream, ObjectMeta, ObjectReference, StrategyImage, BUILD_CONFIG_LABEL,
    };

    fn build_config(name: &str, from: Option<&str>, to: &str) -> BuildConfig {
        let mut bc = BuildConfig {
            metadata: ObjectMeta::named("ns", name),
            ..BuildConfig::default()
        };
        bc.spec.output.to = Some(ObjectReference::new("ImageStreamTag", "ns", to));
        if let Some(from) = from {
            bc.spec.strategy.source_strategy = Some(StrategyImage {
                from: Some(ObjectReference::new("ImageStreamTag", "ns", from)),
            });
        }
        bc
    }

    fn stream(name: &str) -> ImageStream {
        ImageStream {
            metadata: ObjectMeta::named("ns", name),
            ..ImageStream::default()
        }
    }

    fn build(name: &str, phase: BuildPhase, minutes_ago: i64) -> Build {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() - Duration::minutes(minutes_ago);
        let mut meta = ObjectMeta::named("ns", name).with_labels([(BUILD_CONFIG_LABEL, "app")]);
        meta.creation_timestamp = Some(created);
        let mut build = Build {
            metadata: meta,
            ..Build::default()
        };
        build.status.phase = phase;
        build
    }

    #[test]
    fn test_missing_output_stream() {
        let mut builder = TopologyBuilder::new();
        builder.add_build_config(&build_config("app", None, "app:latest")).unwrap();
        let graph = builder.build();

        let markers = find_missing_output_image_streams(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].severity, Severity::Error);

        let mut builder = TopologyBuilder::new();
        builder.add_build_config(&build_config("app", None, "app:latest")).unwrap();
        builder.add_image_stream(&stream("app")).unwrap();
        let graph = builder.build();
        assert!(find_missing_output_image_streams(&graph, &namer(), &ctx()).is_empty());
    }

    #[test]
    fn test_build_config_cycle() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_build_config(&build_config("a", Some("b:latest"), "a:latest"))
            .unwrap();
        builder
            .add_build_config(&build_config("b", Some("a:latest"), "b:latest"))
            .unwrap();
        builder
            .add_build_config(&build_config("c", Some("base:latest"), "c:latest"))
            .unwrap();
        let graph = builder.build();

        let markers = find_circular_builds(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, MarkerKey::CyclicBuildConfig);
        assert_eq!(markers[0].related_nodes.len(), 3);
        assert!(markers[0].message.contains("bc/a"));
        assert!(markers[0].message.contains("bc/b"));
        assert!(!markers[0].message.contains("bc/c"));
    }

    #[test]
    fn test_latest_build_failed() {
        let mut builder = TopologyBuilder::new();
        builder.add_build_config(&build_config("app", None, "app:latest")).unwrap();
        builder.add_build(&build("app-1", BuildPhase::Complete, 30)).unwrap();
        builder.add_build(&build("app-2", BuildPhase::Failed, 10)).unwrap();
        builder.add_build(&build("app-3", BuildPhase::Running, 1)).unwrap();
        let graph = builder.build();

        let markers = find_failed_latest_builds(&graph, &namer(), &ctx());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].message, "bc/app has failed its latest build build/app-2");
    }

    #[test]
    fn test_recovered_build_not_reported() {
        let mut builder = TopologyBuilder::new();
        builder.add_build_config(&build_config("app", None, "app:latest")).unwrap();
        builder.add_build(&build("app-1", BuildPhase::Failed, 30)).unwrap();
        builder.add_build(&build("app-2", BuildPhase::Complete, 10)).unwrap();
        let graph = builder.build();

        assert!(find_failed_latest_builds(&graph, &namer(), &ctx()).is_empty());
    }
}
