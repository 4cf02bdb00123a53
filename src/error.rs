use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealError {
    /// Asked to rewrite a mapping file that is not there
    #[error("selector mapping not found at {}", .0.display())]
    MappingNotFound(PathBuf),

    #[error("failed to read selector mapping {}: {source}", .path.display())]
    MappingRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse selector mapping {}: {source}", .path.display())]
    MappingParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Valid JSON, but neither `{name: selector}` nor `[{nome, selector}]`
    #[error("unsupported selector mapping shape: {0}")]
    MappingShape(String),

    #[error("failed to read snapshot {}: {source}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse snapshot ({context}): {source}")]
    SnapshotParse {
        context: String,
        source: serde_json::Error,
    },

    /// Node.js subprocess failed to spawn
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        source: std::io::Error,
    },

    #[error("{script} exited with {status}: {stderr}")]
    SubprocessFailed {
        script: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
