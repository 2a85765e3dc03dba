//! Replica-managing controllers: replica sets, stateful sets, daemon sets,
//! deployments and deployment configs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::{IntOrString, LabelSelector, ObjectMeta, ObjectReference};
use super::workload::{PodTemplateSpec, ReplicaStatus};

/// Annotation carrying a Deployment's (and its ReplicaSets') revision.
pub const DEPLOYMENT_REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";

/// Annotation naming the DeploymentConfig that created a ReplicationController.
pub const DEPLOYMENT_CONFIG_ANNOTATION: &str = "openshift.io/deployment-config.name";

/// Annotation carrying the DeploymentConfig version a ReplicationController was created for.
pub const DEPLOYMENT_VERSION_ANNOTATION: &str = "openshift.io/deployment-config.latest-version";

/// Parses an integer revision annotation. Missing or malformed values yield `None`.
pub fn revision_annotation(meta: &ObjectMeta, key: &str) -> Option<i64> {
    meta.annotation(key)?.trim().parse().ok()
}

// =============================================================================
// REPLICA SETS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaSet {
    pub metadata: ObjectMeta,
    pub spec: ReplicaSetSpec,
    pub status: ReplicaStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaSetSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

impl ReplicaSet {
    pub fn revision(&self) -> Option<i64> {
        revision_annotation(&self.metadata, DEPLOYMENT_REVISION_ANNOTATION)
    }
}

// =============================================================================
// STATEFUL SETS AND DAEMON SETS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSet {
    pub metadata: ObjectMeta,
    pub spec: StatefulSetSpec,
    pub status: ReplicaStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    pub template: PodTemplateSpec,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonSet {
    pub metadata: ObjectMeta,
    pub spec: DaemonSetSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonSetSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    pub template: PodTemplateSpec,
}

// =============================================================================
// DEPLOYMENTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
    pub status: ReplicaStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    pub template: PodTemplateSpec,
    pub strategy: DeploymentStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStrategy {
    #[serde(rename = "type")]
    pub strategy_type: DeploymentStrategyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdateDeployment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStrategyType {
    #[default]
    RollingUpdate,
    Recreate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingUpdateDeployment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,
}

impl Deployment {
    /// Revision this Deployment currently rolls out.
    pub fn revision(&self) -> Option<i64> {
        revision_annotation(&self.metadata, DEPLOYMENT_REVISION_ANNOTATION)
    }

    /// Whether a rollout may run old and new pods side by side.
    pub fn may_surge(&self) -> bool {
        match self.spec.strategy.strategy_type {
            DeploymentStrategyType::Recreate => false,
            DeploymentStrategyType::RollingUpdate => self
                .spec
                .strategy
                .rolling_update
                .as_ref()
                .and_then(|r| r.max_surge.as_ref())
                .map_or(true, IntOrString::is_positive),
        }
    }
}

// =============================================================================
// DEPLOYMENT CONFIGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfig {
    pub metadata: ObjectMeta,
    pub spec: DeploymentConfigSpec,
    pub status: DeploymentConfigStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfigSpec {
    pub replicas: i32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<DeploymentTriggerPolicy>,
    pub strategy: DeploymentConfigStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfigStatus {
    pub latest_version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerPolicy {
    #[serde(rename = "type")]
    pub trigger_type: DeploymentTriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<DeploymentTriggerImageChangeParams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentTriggerType {
    ConfigChange,
    ImageChange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentTriggerImageChangeParams {
    pub automatic: bool,
    pub container_names: Vec<String>,
    pub from: ObjectReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_triggered_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfigStrategy {
    #[serde(rename = "type")]
    pub strategy_type: DeploymentConfigStrategyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_params: Option<RollingDeploymentParams>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentConfigStrategyType {
    #[default]
    Rolling,
    Recreate,
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingDeploymentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,
}

impl DeploymentConfig {
    /// Image change triggers that name a source image.
    pub fn image_change_triggers(&self) -> impl Iterator<Item = &DeploymentTriggerImageChangeParams> {
        self.spec
            .triggers
            .iter()
            .filter(|t| t.trigger_type == DeploymentTriggerType::ImageChange)
            .filter_map(|t| t.image_change_params.as_ref())
    }

    /// Whether a rollout may run old and new pods side by side.
    pub fn may_surge(&self) -> bool {
        match self.spec.strategy.strategy_type {
            DeploymentConfigStrategyType::Rolling => self
                .spec
                .strategy
                .rolling_params
                .as_ref()
                .and_then(|p| p.max_surge.as_ref())
                .map_or(true, IntOrString::is_positive),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_annotation() {
        let meta = ObjectMeta::named("ns", "rs").with_annotation(DEPLOYMENT_REVISION_ANNOTATION, "3");
        assert_eq!(revision_annotation(&meta, DEPLOYMENT_REVISION_ANNOTATION), Some(3));

        let bad = ObjectMeta::named("ns", "rs").with_annotation(DEPLOYMENT_REVISION_ANNOTATION, "x");
        assert_eq!(revision_annotation(&bad, DEPLOYMENT_REVISION_ANNOTATION), None);
    }

    #[test]
    fn test_deployment_config_surge() {
        let mut dc = DeploymentConfig::default();
        assert!(dc.may_surge());

        dc.spec.strategy.rolling_params = Some(RollingDeploymentParams {
            max_surge: Some(IntOrString::Int(0)),
            max_unavailable: None,
        });
        assert!(!dc.may_surge());

        dc.spec.strategy.strategy_type = DeploymentConfigStrategyType::Recreate;
        assert!(!dc.may_surge());
    }
}
