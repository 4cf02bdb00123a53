use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    browser::extractor::SnapshotSource,
    error::HealError,
    heal::{
        healer::{heal_selectors, HealingReport},
        mapping::LogicalMapping,
        rewriter::{apply, ChangeSet, RewriteOutcome},
    },
    scoring::config::ScoringConfig,
    trace::logger::TraceLogger,
};

pub mod browser;
pub mod cli;
pub mod diff;
pub mod error;
pub mod heal;
pub mod matcher;
pub mod scoring;
pub mod snapshot;
pub mod trace;

/// Healing report written next to the mapping file when something changed.
pub const HEALING_REPORT_FILE: &str = "ElementosAlterados.json";

pub struct HealOptions<'a> {
    pub scoring: &'a ScoringConfig,
    pub extractor_script: &'a str,
    /// Overrides `ElementosAlterados.json` next to the mapping
    pub report_path: Option<&'a Path>,
    pub trace: &'a TraceLogger,
}

#[derive(Debug)]
pub struct HealOutcome {
    pub mapping_path: PathBuf,
    /// Set only when a report was written
    pub report_path: Option<PathBuf>,
    pub report: HealingReport,
    pub rewrite: RewriteOutcome,
}

/// Heal the mapping file at `mapping_path` against the snapshot from
/// `source`, rewrite the file in place and write the healing report.
///
/// A mapping that cannot be read is fatal; it is read before any page is
/// loaded.
pub fn self_heal(
    mapping_path: &Path,
    source: &SnapshotSource,
    options: &HealOptions<'_>,
) -> Result<HealOutcome, HealError> {
    let mapping = LogicalMapping::load(mapping_path)?;
    let snapshot = source.load(options.extractor_script)?;
    info!(
        mapping = %mapping_path.display(),
        entries = mapping.len(),
        elements = snapshot.len(),
        "healing selectors"
    );

    let report = heal_selectors(&mapping, &snapshot, options.scoring, options.trace);
    let rewrite = apply(&ChangeSet::from_healing(&report), &mapping);
    if rewrite.changed() {
        rewrite.mapping.save(mapping_path)?;
    }

    let report_path = if report.is_empty() {
        None
    } else {
        let path = options
            .report_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| healing_report_path(mapping_path));
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        Some(path)
    };

    Ok(HealOutcome {
        mapping_path: mapping_path.to_path_buf(),
        report_path,
        report,
        rewrite,
    })
}

/// `ElementosAlterados.json` in the mapping file's directory.
pub fn healing_report_path(mapping_path: &Path) -> PathBuf {
    mapping_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(HEALING_REPORT_FILE)
}
