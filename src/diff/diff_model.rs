use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a moved element was re-identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveIdentity {
    /// Same non-empty id at a different xpath
    #[serde(rename = "id")]
    Id(String),

    /// Fingerprint similarity, reported as a percentage
    #[serde(rename = "similaridade")]
    Similarity(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovedElement {
    #[serde(flatten)]
    pub identity: MoveIdentity,
    #[serde(rename = "de")]
    pub from: String,
    #[serde(rename = "para")]
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    #[serde(rename = "antes")]
    pub before: Option<String>,
    #[serde(rename = "depois")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedElement {
    pub xpath: String,
    #[serde(rename = "diferencas")]
    pub changes: BTreeMap<String, AttributeChange>,
}

/// Structural diff between two snapshots. Empty categories are left out of
/// the serialized report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiffResult {
    #[serde(rename = "movidos", default, skip_serializing_if = "Vec::is_empty")]
    pub moved: Vec<MovedElement>,

    /// Document order of the before snapshot
    #[serde(rename = "removidos", default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,

    /// Document order of the after snapshot
    #[serde(rename = "adicionados", default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,

    #[serde(rename = "alterados", default, skip_serializing_if = "Vec::is_empty")]
    pub modified: Vec<ModifiedElement>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.removed.is_empty() && self.added.is_empty() && self.modified.is_empty()
    }

    pub fn moved_from(&self, xpath: &str) -> Option<&MovedElement> {
        self.moved.iter().find(|m| m.from == xpath)
    }

    pub fn is_move_endpoint(&self, xpath: &str) -> bool {
        self.moved.iter().any(|m| m.from == xpath || m.to == xpath)
    }

    /// One-line count summary, e.g. for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Added: {}, Removed: {}, Modified: {}, Moved: {}",
            self.added.len(),
            self.removed.len(),
            self.modified.len(),
            self.moved.len()
        )
    }
}
