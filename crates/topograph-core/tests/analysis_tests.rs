use chrono::{DateTime, Duration, TimeZone, Utc};

use topograph_core::config::AnalysisConfig;
use topograph_core::graph::MarkerKey;
use topograph_core::objects::{
    Container, ContainerState, ContainerStateTerminated, ContainerStateWaiting, ContainerStatus, DeploymentConfig,
    Object, ObjectMeta, Pod, PodTemplateSpec, Route, RouteTargetReference,
};
use topograph_core::{analyze, build_graph, AnalysisContext, Config, NamespacedNamer, Severity};

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn fifteen_minute_window() -> AnalysisConfig {
    AnalysisConfig {
        restart_window_minutes: 15,
        ..AnalysisConfig::default()
    }
}

fn crashing_pod(finished_at: DateTime<Utc>, restarts: i32) -> Pod {
    let mut pod = Pod {
        metadata: ObjectMeta::named("ns", "worker"),
        ..Pod::default()
    };
    pod.status.container_statuses.push(ContainerStatus {
        name: "main".to_string(),
        restart_count: restarts,
        state: ContainerState {
            waiting: Some(ContainerStateWaiting {
                reason: "CrashLoopBackOff".to_string(),
            }),
            ..ContainerState::default()
        },
        last_state: ContainerState {
            terminated: Some(ContainerStateTerminated {
                reason: "Error".to_string(),
                exit_code: 137,
                finished_at: Some(finished_at),
            }),
            ..ContainerState::default()
        },
        ..ContainerStatus::default()
    });
    pod
}

#[test]
fn test_crash_loop_inside_window() {
    let now = reference_time();
    let objects = vec![Object::Pod(crashing_pod(now - Duration::minutes(10), 6))];
    let graph = build_graph(&objects);
    let ctx = AnalysisContext::new(now, fifteen_minute_window());

    let markers = analyze(&graph, &NamespacedNamer::new("ns"), &ctx);
    let crash = markers.by_key(MarkerKey::CrashLoopingPod);
    assert_eq!(crash.len(), 1);
    assert_eq!(crash[0].severity, Severity::Error);
    assert!(markers.by_key(MarkerKey::RestartingPod).is_empty());
}

#[test]
fn test_crash_loop_outside_window_falls_back_to_restart_count() {
    let finished_at = reference_time() - Duration::minutes(10);
    let objects = vec![Object::Pod(crashing_pod(finished_at, 6))];
    let graph = build_graph(&objects);
    let later = AnalysisContext::new(reference_time() + Duration::minutes(20), fifteen_minute_window());

    let markers = analyze(&graph, &NamespacedNamer::new("ns"), &later);
    assert!(markers.by_key(MarkerKey::CrashLoopingPod).is_empty());
    let restarting = markers.by_key(MarkerKey::RestartingPod);
    assert_eq!(restarting.len(), 1);
    assert_eq!(restarting[0].severity, Severity::Warning);
    assert_eq!(restarting[0].message, "container \"main\" in pod/worker has restarted 6 times");
}

#[test]
fn test_crash_loop_outside_window_below_threshold_is_quiet() {
    let finished_at = reference_time() - Duration::minutes(10);
    let objects = vec![Object::Pod(crashing_pod(finished_at, 2))];
    let graph = build_graph(&objects);
    let later = AnalysisContext::new(reference_time() + Duration::minutes(20), fifteen_minute_window());

    assert!(analyze(&graph, &NamespacedNamer::new("ns"), &later).is_empty());
}

#[test]
fn test_termination_in_the_future_is_not_recent() {
    let now = reference_time();
    let objects = vec![Object::Pod(crashing_pod(now + Duration::minutes(5), 1))];
    let graph = build_graph(&objects);
    let ctx = AnalysisContext::new(now, fifteen_minute_window());

    assert!(analyze(&graph, &NamespacedNamer::new("ns"), &ctx).is_empty());
}

fn probeless_deployment_config() -> DeploymentConfig {
    let mut template = PodTemplateSpec::default();
    template.spec.containers.push(Container::new("web", "registry.example.com/shop/web:1"));
    let mut dc = DeploymentConfig {
        metadata: ObjectMeta::named("ns", "web"),
        ..DeploymentConfig::default()
    };
    dc.spec.replicas = 1;
    dc.spec.template = Some(template);
    dc
}

fn dangling_route() -> Route {
    let mut route = Route {
        metadata: ObjectMeta::named("ns", "front"),
        ..Route::default()
    };
    route.spec.to = RouteTargetReference {
        kind: "Service".to_string(),
        name: "web".to_string(),
        weight: None,
    };
    route
}

#[test]
fn test_analyze_orders_errors_first() {
    let now = reference_time();
    let objects = vec![
        Object::DeploymentConfig(probeless_deployment_config()),
        Object::Route(dangling_route()),
        Object::Pod(crashing_pod(now - Duration::minutes(1), 3)),
    ];
    let graph = build_graph(&objects);
    let ctx = AnalysisContext::from_config(now, &Config::default());
    let markers = analyze(&graph, &NamespacedNamer::new("ns"), &ctx);

    let severities: Vec<Severity> = markers.iter().map(|m| m.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, sorted);

    assert_eq!(markers.by_key(MarkerKey::MissingRouteService).len(), 1);
    assert_eq!(
        markers.by_key(MarkerKey::MissingRouteService)[0].message,
        "route/front is supposed to route traffic to svc/web, but svc/web doesn't exist"
    );
    assert_eq!(markers.by_key(MarkerKey::CrashLoopingPod).len(), 1);

    let readiness = markers.by_key(MarkerKey::MissingReadinessProbe);
    assert_eq!(readiness.len(), 1);
    assert_eq!(readiness[0].severity, Severity::Warning);
    assert!(readiness[0]
        .suggestion
        .as_deref()
        .is_some_and(|s| s.starts_with("oc set probe dc/web --readiness")));

    let liveness = markers.by_key(MarkerKey::MissingLivenessProbe);
    assert_eq!(liveness.len(), 1);
    assert_eq!(liveness[0].severity, Severity::Info);
    assert_eq!(markers.iter().last().map(|m| m.severity), Some(Severity::Info));
}

#[test]
fn test_namer_qualifies_foreign_namespaces() {
    let objects = vec![Object::Route(dangling_route())];
    let graph = build_graph(&objects);
    let ctx = AnalysisContext::from_config(reference_time(), &Config::default());

    let markers = analyze(&graph, &NamespacedNamer::new("elsewhere"), &ctx);
    assert_eq!(markers.len(), 1);
    assert_eq!(
        markers.iter().next().map(|m| m.message.as_str()),
        Some("route/front[ns] is supposed to route traffic to svc/web[ns], but svc/web[ns] doesn't exist")
    );
}

#[test]
fn test_analyze_is_deterministic() {
    let now = reference_time();
    let objects = vec![
        Object::DeploymentConfig(probeless_deployment_config()),
        Object::Route(dangling_route()),
        Object::Pod(crashing_pod(now - Duration::minutes(1), 3)),
    ];
    let ctx = AnalysisContext::from_config(now, &Config::default());
    let first = analyze(&build_graph(&objects), &NamespacedNamer::new("ns"), &ctx);
    let second = analyze(&build_graph(&objects), &NamespacedNamer::new("ns"), &ctx);
    assert_eq!(first, second);
}
