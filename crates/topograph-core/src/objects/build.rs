//! Build configurations and the builds they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::{ObjectMeta, ObjectReference};

/// Label and annotation linking a Build to its BuildConfig.
pub const BUILD_CONFIG_LABEL: &str = "openshift.io/build-config.name";

/// Older builds carry this shorter label instead.
pub const LEGACY_BUILD_CONFIG_LABEL: &str = "buildconfig";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    pub metadata: ObjectMeta,
    pub spec: BuildConfigSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfigSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<BuildTriggerPolicy>,
    pub source: BuildSource,
    pub strategy: BuildStrategy,
    pub output: BuildOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitBuildSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitBuildSource {
    pub uri: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildStrategy {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_strategy: Option<StrategyImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_strategy: Option<StrategyImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_strategy: Option<StrategyImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

impl BuildStrategy {
    /// Builder or base image the strategy starts from.
    pub fn base_image(&self) -> Option<&ObjectReference> {
        [&self.source_strategy, &self.docker_strategy, &self.custom_strategy]
            .into_iter()
            .flatten()
            .find_map(|s| s.from.as_ref())
            .filter(|from| !from.name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<ObjectReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerPolicy {
    #[serde(rename = "type")]
    pub trigger_type: BuildTriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change: Option<ImageChangeTrigger>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildTriggerType {
    ImageChange,
    ConfigChange,
    GitHub,
    GitLab,
    Bitbucket,
    Generic,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageChangeTrigger {
    /// Image to watch. `None` means the strategy's base image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_triggered_image_id: Option<String>,
}

impl BuildConfig {
    /// Images whose changes trigger a new build.
    pub fn trigger_images(&self) -> Vec<&ObjectReference> {
        self.spec
            .triggers
            .iter()
            .filter(|t| t.trigger_type == BuildTriggerType::ImageChange)
            .filter_map(|t| match t.image_change.as_ref().and_then(|ic| ic.from.as_ref()) {
                Some(from) => Some(from),
                None => self.spec.strategy.base_image(),
            })
            .collect()
    }
}

// =============================================================================
// BUILDS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Build {
    pub metadata: ObjectMeta,
    pub spec: BuildSpec,
    pub status: BuildStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSpec {
    pub source: BuildSource,
    pub strategy: BuildStrategy,
    pub output: BuildOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildStatus {
    pub phase: BuildPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ObjectReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildPhase {
    #[default]
    New,
    Pending,
    Running,
    Complete,
    Failed,
    Error,
    Cancelled,
}

impl BuildPhase {
    pub fn is_unsuccessful(self) -> bool {
        matches!(self, BuildPhase::Failed | BuildPhase::Error | BuildPhase::Cancelled)
    }

    pub fn is_active(self) -> bool {
        matches!(self, BuildPhase::New | BuildPhase::Pending | BuildPhase::Running)
    }
}

impl Build {
    /// Name of the BuildConfig that created this build, if recorded.
    pub fn build_config_name(&self) -> Option<&str> {
        let meta = &self.metadata;
        meta.labels
            .get(BUILD_CONFIG_LABEL)
            .or_else(|| meta.annotations.get(BUILD_CONFIG_LABEL))
            .or_else(|| meta.labels.get(LEGACY_BUILD_CONFIG_LABEL))
            .map(String::as_str)
            .or_else(|| self.status.config.as_ref().map(|c| c.name.as_str()))
            .filter(|name| !name.is_empty())
    }

    /// Timestamp used to order builds, newest first.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .creation_timestamp
            .or(self.status.start_timestamp)
    }
}
