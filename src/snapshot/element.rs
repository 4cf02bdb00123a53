use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::HealError;

/// Attributes every extractor captures, in the order they are compared.
pub const WELL_KNOWN_ATTRIBUTES: [&str; 6] = ["id", "class", "text", "name", "type", "aria_label"];

/// Prefix of the open set of custom attributes (`data-foo` becomes `data_foo`).
pub const DATA_ATTRIBUTE_PREFIX: &str = "data_";

/// One DOM node as captured by the extraction collaborator.
///
/// `xpath` is the identity key inside a snapshot. Everything else is optional
/// because extractors disagree on whether a missing attribute is `""`, `null`
/// or simply absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    pub xpath: String,

    /// `data_*` attributes and any other key the extractor emitted.
    #[serde(flatten, deserialize_with = "stringify_values")]
    pub data: BTreeMap<String, String>,
}

impl ElementRecord {
    pub fn new(tag: &str, xpath: &str) -> Self {
        Self {
            tag: tag.to_string(),
            xpath: xpath.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_type(mut self, input_type: &str) -> Self {
        self.r#type = Some(input_type.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    /// Look up an attribute by its snapshot key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "tag" => Some(self.tag.as_str()),
            "id" => self.id.as_deref(),
            "name" => self.name.as_deref(),
            "class" => self.class.as_deref(),
            "text" => self.text.as_deref(),
            "type" => self.r#type.as_deref(),
            "aria_label" => self.aria_label.as_deref(),
            "xpath" => Some(self.xpath.as_str()),
            other => self.data.get(other).map(String::as_str),
        }
    }

    /// Non-empty attribute value, the only kind the matcher ever considers.
    pub fn present(&self, key: &str) -> Option<&str> {
        self.attribute(key).filter(|v| !v.is_empty())
    }

    /// Whitespace-separated tokens of the class attribute.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.class.as_deref().unwrap_or("").split_whitespace()
    }

    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.data
            .keys()
            .map(String::as_str)
            .filter(|k| k.starts_with(DATA_ATTRIBUTE_PREFIX))
    }
}

fn stringify_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}

// ============================================================================
// Snapshot files
// ============================================================================

pub fn parse_snapshot(raw: &str, context: &str) -> Result<Vec<ElementRecord>, HealError> {
    serde_json::from_str(raw).map_err(|e| HealError::SnapshotParse {
        context: context.to_string(),
        source: e,
    })
}

pub fn load_snapshot(path: &Path) -> Result<Vec<ElementRecord>, HealError> {
    let raw = std::fs::read_to_string(path).map_err(|e| HealError::SnapshotRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_snapshot(&raw, &path.display().to_string())
}

pub fn save_snapshot(path: &Path, snapshot: &[ElementRecord]) -> Result<(), HealError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// SHA-1 of the serialized snapshot. Equal digests mean nothing to diff.
pub fn snapshot_digest(snapshot: &[ElementRecord]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    for element in snapshot {
        // serialization of a plain struct with string fields cannot fail
        if let Ok(json) = serde_json::to_string(element) {
            hasher.update(json.as_bytes());
        }
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
