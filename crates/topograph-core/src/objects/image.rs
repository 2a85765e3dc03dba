//! Image streams, image stream tags and plain image references.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::{ObjectMeta, ObjectReference};

/// Tag assumed when a reference names none.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStream {
    pub metadata: ObjectMeta,
    pub spec: ImageStreamSpec,
    pub status: ImageStreamStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStreamSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_image_repository: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagReference {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
    pub import_policy: TagImportPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagImportPolicy {
    pub scheduled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStreamStatus {
    /// Internal registry location. Empty until the stream is usable as a push target.
    pub docker_image_repository: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<NamedTagEventList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedTagEventList {
    pub tag: String,
    pub items: Vec<TagEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagEvent {
    pub docker_image_reference: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl ImageStream {
    /// Tags that have at least one imported or pushed image.
    pub fn resolved_tags(&self) -> impl Iterator<Item = &NamedTagEventList> {
        self.status.tags.iter().filter(|t| !t.items.is_empty())
    }

    pub fn is_scheduled_import(&self, tag: &str) -> bool {
        self.spec
            .tags
            .iter()
            .any(|t| t.name == tag && t.import_policy.scheduled)
    }
}

/// A single tag of an image stream, named `<stream>:<tag>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStreamTag {
    pub metadata: ObjectMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<TagEvent>,
}

impl ImageStreamTag {
    /// Placeholder tag object for `namespace/stream:tag`.
    pub fn named(namespace: impl Into<String>, stream: &str, tag: &str) -> Self {
        Self {
            metadata: ObjectMeta::named(namespace, join_image_stream_tag(stream, tag)),
            image: None,
        }
    }

    /// The stream and tag halves of the name.
    pub fn stream_and_tag(&self) -> (&str, &str) {
        let (stream, tag, _) = split_image_stream_tag(&self.metadata.name);
        (stream, tag)
    }
}

/// Splits `stream:tag`. The flag reports whether a tag was present;
/// when it was not, the default tag is returned.
pub fn split_image_stream_tag(name: &str) -> (&str, &str, bool) {
    match name.rsplit_once(':') {
        Some((stream, tag)) if !tag.is_empty() => (stream, tag, true),
        Some((stream, _)) => (stream, DEFAULT_IMAGE_TAG, false),
        None => (name, DEFAULT_IMAGE_TAG, false),
    }
}

pub fn join_image_stream_tag(stream: &str, tag: &str) -> String {
    let tag = if tag.is_empty() { DEFAULT_IMAGE_TAG } else { tag };
    format!("{stream}:{tag}")
}

// =============================================================================
// IMAGE REFERENCES
// =============================================================================

/// A parsed pull spec such as `registry.example.com:5000/team/app:v1@sha256:...`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageReference {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registry: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl ImageReference {
    /// Parses a pull spec. Returns `None` for an empty or nameless spec.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }

        let (rest, id) = match spec.split_once('@') {
            Some((rest, id)) => (rest, id.to_string()),
            None => (spec, String::new()),
        };

        let mut parts: Vec<&str> = rest.split('/').collect();
        let last = parts.pop()?;
        let (name, tag) = match last.rsplit_once(':') {
            Some((name, tag)) => (name, tag.to_string()),
            None => (last, String::new()),
        };
        if name.is_empty() {
            return None;
        }

        let registry = match parts.first() {
            Some(first) if first.contains('.') || first.contains(':') || *first == "localhost" => {
                parts.remove(0).to_string()
            }
            _ => String::new(),
        };

        Some(Self {
            registry,
            namespace: parts.join("/"),
            name: name.to_string(),
            tag,
            id,
        })
    }

    /// Copy with the default tag filled in when neither tag nor digest is set.
    pub fn with_default_tag(&self) -> Self {
        let mut out = self.clone();
        if out.tag.is_empty() && out.id.is_empty() {
            out.tag = DEFAULT_IMAGE_TAG.to_string();
        }
        out
    }

    /// Repository portion without tag or digest.
    pub fn repository(&self) -> String {
        [self.registry.as_str(), self.namespace.as_str(), self.name.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository())?;
        if !self.tag.is_empty() {
            write!(f, ":{}", self.tag)?;
        }
        if !self.id.is_empty() {
            write!(f, "@{}", self.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name() {
        let r = ImageReference::parse("nginx").unwrap();
        assert_eq!(r.name, "nginx");
        assert!(r.registry.is_empty());
        assert_eq!(r.with_default_tag().to_string(), "nginx:latest");
    }

    #[test]
    fn test_parse_registry_port_and_digest() {
        let r = ImageReference::parse("registry.local:5000/team/app:v1@sha256:abc").unwrap();
        assert_eq!(r.registry, "registry.local:5000");
        assert_eq!(r.namespace, "team");
        assert_eq!(r.name, "app");
        assert_eq!(r.tag, "v1");
        assert_eq!(r.id, "sha256:abc");
        assert_eq!(r.to_string(), "registry.local:5000/team/app:v1@sha256:abc");
    }

    #[test]
    fn test_parse_namespace_without_registry() {
        let r = ImageReference::parse("library/redis:7").unwrap();
        assert_eq!(r.namespace, "library");
        assert_eq!(r.repository(), "library/redis");
    }

    #[test]
    fn test_parse_empty() {
        assert!(ImageReference::parse("  ").is_none());
        assert!(ImageReference::parse("registry.io/").is_none());
    }

    #[test]
    fn test_split_image_stream_tag() {
        assert_eq!(split_image_stream_tag("app:v2"), ("app", "v2", true));
        assert_eq!(split_image_stream_tag("app"), ("app", "latest", false));
    }
}
