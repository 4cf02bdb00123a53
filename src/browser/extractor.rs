use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::HealError;
use crate::snapshot::element::{load_snapshot, ElementRecord};

/// Extraction script shipped with the crate, relative to the working directory.
pub const DEFAULT_EXTRACTOR_SCRIPT: &str = "node/dom-extraction/snapshot.js";

/// Run `node <script> <url>` and parse the snapshot it prints.
pub fn extract_snapshot(url: &str, script: &str) -> Result<Vec<ElementRecord>, HealError> {
    debug!(url, script, "extracting snapshot");

    let output = Command::new("node")
        .arg(script)
        .arg(url)
        .output()
        .map_err(|e| HealError::SubprocessSpawn {
            script: script.to_string(),
            source: e,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(HealError::SubprocessFailed {
            script: script.to_string(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }
    if !stderr.trim().is_empty() {
        warn!(script, stderr = %stderr.trim(), "extractor wrote to stderr");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let snapshot = parse_extraction_output(&stdout, url)?;
    debug!(url, elements = snapshot.len(), "snapshot extracted");
    Ok(snapshot)
}

/// Extractor output is either a bare array of element records or an object
/// carrying them under `elements`.
pub fn parse_extraction_output(stdout: &str, url: &str) -> Result<Vec<ElementRecord>, HealError> {
    let context = format!("extractor output for {url}");
    let value: Value = serde_json::from_str(stdout).map_err(|e| HealError::SnapshotParse {
        context: context.clone(),
        source: e,
    })?;

    let elements = match value {
        Value::Object(mut obj) => obj.remove("elements").unwrap_or(Value::Array(vec![])),
        other => other,
    };

    serde_json::from_value(elements).map_err(|e| HealError::SnapshotParse { context, source: e })
}

/// Where a healing run or capture gets its current snapshot from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    /// Live page, through the Node extractor
    Url(String),
    /// Previously saved snapshot file
    File(PathBuf),
}

impl SnapshotSource {
    pub fn load(&self, script: &str) -> Result<Vec<ElementRecord>, HealError> {
        match self {
            SnapshotSource::Url(url) => extract_snapshot(url, script),
            SnapshotSource::File(path) => load_snapshot(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_array() {
        let out = r#"[{"tag": "button", "id": "btnEnviar", "xpath": "/html/body/button[1]"}]"#;
        let snapshot = parse_extraction_output(out, "http://x").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_deref(), Some("btnEnviar"));
    }

    #[test]
    fn accepts_wrapped_elements() {
        let out = r#"{"url": "http://x", "elements": [{"tag": "a", "xpath": "/html/body/a[1]", "data_qa": "link"}]}"#;
        let snapshot = parse_extraction_output(out, "http://x").unwrap();
        assert_eq!(snapshot[0].attribute("data_qa"), Some("link"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_extraction_output("not json", "http://x"),
            Err(HealError::SnapshotParse { .. })
        ));
    }
}
