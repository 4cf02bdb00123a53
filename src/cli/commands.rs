use std::path::Path;

use tracing::{info, warn};

use crate::browser::extractor::SnapshotSource;
use crate::cli::config::AppConfig;
use crate::diff::diff_model::DiffResult;
use crate::diff::differ::{diff, DiffOptions};
use crate::error::HealError;
use crate::heal::mapping::LogicalMapping;
use crate::heal::rewriter::{rewrite_mapping_file, ChangeSet};
use crate::heal::session::{CaptureOutcome, HealSession};
use crate::snapshot::element::load_snapshot;
use crate::trace::logger::TraceLogger;
use crate::{self_heal, HealOptions, HealOutcome};

// ============================================================================
// heal subcommand
// ============================================================================

pub fn cmd_heal(
    mapping_path: &Path,
    source: &SnapshotSource,
    report_path: Option<&Path>,
    trace_path: Option<&Path>,
    config: &AppConfig,
) -> Result<HealOutcome, HealError> {
    let tracer = match trace_path.or(config.trace.path.as_deref()) {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let options = HealOptions {
        scoring: &config.scoring,
        extractor_script: &config.extractor.script,
        report_path,
        trace: &tracer,
    };
    let outcome = self_heal(mapping_path, source, &options)?;

    println!(
        "Healed {} of {} selectors in {}",
        outcome.rewrite.log.len(),
        outcome.rewrite.mapping.len(),
        outcome.mapping_path.display()
    );
    for edit in &outcome.rewrite.log {
        println!("  {}", edit);
    }
    if let Some(report) = &outcome.report_path {
        println!("Report: {}", report.display());
    }

    Ok(outcome)
}

// ============================================================================
// diff subcommand
// ============================================================================

pub fn cmd_diff(
    before_path: &Path,
    after_path: &Path,
    output: Option<&Path>,
    options: &DiffOptions,
) -> Result<DiffResult, HealError> {
    let before = load_snapshot(before_path)?;
    let after = load_snapshot(after_path)?;

    let result = diff(&before, &after, options);
    let json = serde_json::to_string_pretty(&result)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("{}", result.summary());
            println!("Diff written to: {}", path.display());
        }
        None => {
            println!("{}", json);
            eprintln!("{}", result.summary());
        }
    }

    Ok(result)
}

// ============================================================================
// capture subcommand
// ============================================================================

/// Capture `screen`, and when it changed, rewrite `elements` from the diff
/// before committing the new baseline. A failed rewrite keeps the old
/// baseline.
pub fn cmd_capture(
    screen: &str,
    source: &SnapshotSource,
    elements: Option<&Path>,
    store: &Path,
    config: &AppConfig,
) -> Result<CaptureOutcome, HealError> {
    let snapshot = source.load(&config.extractor.script)?;
    let mut session = HealSession::new(store, config.diff.clone());

    let outcome = session.begin_capture(screen, snapshot)?;

    match &outcome {
        CaptureOutcome::Baseline => println!("{}: baseline captured", screen),
        CaptureOutcome::Unchanged => println!("{}: unchanged", screen),
        CaptureOutcome::Changed { diff, previous } => {
            println!("{}: {}", screen, diff.summary());

            if let Some(mapping_path) = elements {
                let rewritten = LogicalMapping::load(mapping_path)
                    .map(|mapping| ChangeSet::from_diff(diff, previous, &mapping))
                    .and_then(|changes| rewrite_mapping_file(mapping_path, &changes));

                match rewritten {
                    Ok(rewrite) => {
                        for edit in &rewrite.log {
                            println!("  {}", edit);
                        }
                    }
                    Err(e) => {
                        warn!(screen, error = %e, "mapping rewrite failed, baseline kept");
                        session.fail(screen);
                        return Err(e);
                    }
                }
            }
        }
    }

    session.commit(screen)?;
    info!(screen, store = %store.display(), "capture committed");
    Ok(outcome)
}
