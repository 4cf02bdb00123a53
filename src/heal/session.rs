use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::diff::diff_model::DiffResult;
use crate::diff::differ::{diff, DiffOptions};
use crate::error::HealError;
use crate::snapshot::element::{load_snapshot, save_snapshot, snapshot_digest, ElementRecord};

/// How a fresh capture relates to the stored baseline of its screen.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// No baseline yet; committing makes this capture the baseline
    Baseline,
    /// Same digest as the baseline
    Unchanged,
    Changed {
        diff: DiffResult,
        previous: Vec<ElementRecord>,
    },
}

struct PendingCapture {
    snapshot: Vec<ElementRecord>,
    diff: Option<DiffResult>,
}

/// Baseline snapshots per screen name, stored under one directory:
///
/// ```text
/// <store>/snapshots/<screen>.json
/// <store>/diffs/<screen>_diff.json
/// ```
///
/// A capture is held in the session until `commit` (the run using it
/// passed) or `fail` (it did not, the old baseline stays).
pub struct HealSession {
    store: PathBuf,
    diff_options: DiffOptions,
    pending: HashMap<String, PendingCapture>,
}

impl HealSession {
    pub fn new(store: impl Into<PathBuf>, diff_options: DiffOptions) -> Self {
        Self {
            store: store.into(),
            diff_options,
            pending: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn snapshot_path(&self, screen: &str) -> PathBuf {
        self.store.join("snapshots").join(format!("{screen}.json"))
    }

    pub fn diff_path(&self, screen: &str) -> PathBuf {
        self.store.join("diffs").join(format!("{screen}_diff.json"))
    }

    /// Stored baseline for `screen`, if one was ever committed.
    pub fn baseline(&self, screen: &str) -> Result<Option<Vec<ElementRecord>>, HealError> {
        let path = self.snapshot_path(screen);
        if !path.exists() {
            return Ok(None);
        }
        load_snapshot(&path).map(Some)
    }

    /// Compare `snapshot` with the baseline and hold it until `commit` or
    /// `fail`. A second capture of the same screen replaces the first.
    pub fn begin_capture(&mut self, screen: &str, snapshot: Vec<ElementRecord>) -> Result<CaptureOutcome, HealError> {
        let outcome = match self.baseline(screen)? {
            None => CaptureOutcome::Baseline,
            Some(previous) if snapshot_digest(&previous) == snapshot_digest(&snapshot) => CaptureOutcome::Unchanged,
            Some(previous) => CaptureOutcome::Changed {
                diff: diff(&previous, &snapshot, &self.diff_options),
                previous,
            },
        };

        debug!(screen, elements = snapshot.len(), "capture pending");
        let diff = match &outcome {
            CaptureOutcome::Changed { diff, .. } => Some(diff.clone()),
            _ => None,
        };
        self.pending.insert(screen.to_string(), PendingCapture { snapshot, diff });

        Ok(outcome)
    }

    /// Persist the pending capture as the new baseline, plus its diff if it
    /// had one. Returns `false` when nothing was pending.
    pub fn commit(&mut self, screen: &str) -> Result<bool, HealError> {
        let Some(capture) = self.pending.remove(screen) else {
            return Ok(false);
        };

        save_snapshot(&self.snapshot_path(screen), &capture.snapshot)?;

        if let Some(diff) = capture.diff {
            let path = self.diff_path(screen);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, serde_json::to_string_pretty(&diff)?)?;
            info!(screen, summary = %diff.summary(), diff = %path.display(), "baseline updated");
        } else {
            info!(screen, "baseline saved");
        }

        Ok(true)
    }

    /// Drop the pending capture. Returns `false` when nothing was pending.
    pub fn fail(&mut self, screen: &str) -> bool {
        let dropped = self.pending.remove(screen).is_some();
        if dropped {
            debug!(screen, "pending capture discarded");
        }
        dropped
    }

    pub fn has_pending(&self, screen: &str) -> bool {
        self.pending.contains_key(screen)
    }
}
