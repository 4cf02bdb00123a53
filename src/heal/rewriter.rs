use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::diff::diff_model::DiffResult;
use crate::error::HealError;
use crate::heal::healer::HealingReport;
use crate::heal::mapping::LogicalMapping;
use crate::matcher::selector::{format_selector, parse_selector, SelectorKind};
use crate::scoring::keywords::is_ignored_class_token;
use crate::snapshot::element::ElementRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEdit {
    Update { logical_name: String, selector: String },
    Remove { logical_name: String },
}

impl SelectorEdit {
    pub fn logical_name(&self) -> &str {
        match self {
            SelectorEdit::Update { logical_name, .. } | SelectorEdit::Remove { logical_name } => logical_name,
        }
    }
}

/// Edits to apply to a mapping. New elements never get an entry: naming
/// them is left to a human.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet {
    pub edits: Vec<SelectorEdit>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn from_healing(report: &HealingReport) -> Self {
        Self {
            edits: report
                .changes
                .iter()
                .map(|c| SelectorEdit::Update {
                    logical_name: c.logical_name.clone(),
                    selector: c.new_selector.clone(),
                })
                .collect(),
        }
    }

    /// Edits implied by a structural diff for the entries of `mapping`.
    /// `before` is the snapshot the diff was computed from, used to resolve
    /// selectors to xpaths. An entry is deleted only when every element it
    /// addressed there was removed.
    pub fn from_diff(diff: &DiffResult, before: &[ElementRecord], mapping: &LogicalMapping) -> Self {
        let mut edits = Vec::new();

        for entry in &mapping.entries {
            let parsed = parse_selector(&entry.selector);

            if let Some(moved) = diff.moved_from(&entry.selector) {
                edits.push(SelectorEdit::Update {
                    logical_name: entry.logical_name.clone(),
                    selector: moved.to.clone(),
                });
                continue;
            }

            let addressed = resolve(parsed.kind, &parsed.value, before);
            let all_removed = addressed
                .iter()
                .all(|xpath| diff.removed.iter().any(|r| r == xpath));
            if !addressed.is_empty() && all_removed {
                edits.push(SelectorEdit::Remove {
                    logical_name: entry.logical_name.clone(),
                });
                continue;
            }

            if let Some(selector) = renamed_selector(parsed.kind, &parsed.value, diff) {
                edits.push(SelectorEdit::Update {
                    logical_name: entry.logical_name.clone(),
                    selector,
                });
            }
        }

        Self { edits }
    }
}

/// Xpaths of every element the selector addresses. A class selector can
/// address several.
fn resolve<'a>(kind: SelectorKind, value: &str, snapshot: &'a [ElementRecord]) -> Vec<&'a str> {
    snapshot
        .iter()
        .filter(|e| match kind {
            SelectorKind::Xpath => e.xpath == value,
            SelectorKind::Id => e.present("id") == Some(value),
            SelectorKind::Name => e.present("name") == Some(value),
            SelectorKind::Class => e.class_tokens().any(|t| t == value),
        })
        .map(|e| e.xpath.as_str())
        .collect()
}

/// New selector for an id/name/class value that changed in place.
fn renamed_selector(kind: SelectorKind, value: &str, diff: &DiffResult) -> Option<String> {
    if kind == SelectorKind::Xpath {
        return None;
    }

    diff.modified.iter().find_map(|m| {
        let change = m.changes.get(kind.as_str())?;
        let before = change.before.as_deref()?;
        let after = change.after.as_deref().filter(|a| !a.is_empty())?;

        match kind {
            SelectorKind::Class => {
                let old_tokens: Vec<&str> = before.split_whitespace().collect();
                if !old_tokens.contains(&value) {
                    return None;
                }
                let mut fresh = after
                    .split_whitespace()
                    .filter(|t| !is_ignored_class_token(t));
                let token = fresh
                    .clone()
                    .find(|t| !old_tokens.contains(t))
                    .or_else(|| fresh.next())?;
                Some(format_selector(kind, token))
            }
            _ => (before == value).then(|| format_selector(kind, after)),
        }
    })
}

/// One edit that actually changed the mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEdit {
    pub logical_name: String,
    pub old_selector: String,
    /// `None` when the entry was deleted
    pub new_selector: Option<String>,
}

impl fmt::Display for AppliedEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.new_selector {
            Some(new) => write!(f, "{}: {} -> {}", self.logical_name, self.old_selector, new),
            None => write!(f, "{}: {} removed", self.logical_name, self.old_selector),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub mapping: LogicalMapping,
    /// Empty when the mapping was already up to date
    pub log: Vec<AppliedEdit>,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        !self.log.is_empty()
    }
}

/// Apply `changes` to a copy of `mapping`. Applying the same changes to the
/// result again logs nothing.
pub fn apply(changes: &ChangeSet, mapping: &LogicalMapping) -> RewriteOutcome {
    let mut updated = mapping.clone();
    let mut log = Vec::new();

    for edit in &changes.edits {
        let Some(current) = updated.get(edit.logical_name()).map(str::to_string) else {
            debug!(logical_name = edit.logical_name(), "edit targets an unknown entry, skipped");
            continue;
        };

        match edit {
            SelectorEdit::Update { logical_name, selector } => {
                if current == *selector {
                    continue;
                }
                updated.set(logical_name, selector);
                log.push(AppliedEdit {
                    logical_name: logical_name.clone(),
                    old_selector: current,
                    new_selector: Some(selector.clone()),
                });
            }
            SelectorEdit::Remove { logical_name } => {
                updated.remove(logical_name);
                log.push(AppliedEdit {
                    logical_name: logical_name.clone(),
                    old_selector: current,
                    new_selector: None,
                });
            }
        }
    }

    for applied in &log {
        info!(edit = %applied, "mapping entry rewritten");
    }

    RewriteOutcome { mapping: updated, log }
}

/// Load the mapping at `path`, apply `changes`, and overwrite the file in
/// its original shape if anything changed.
pub fn rewrite_mapping_file(path: &Path, changes: &ChangeSet) -> Result<RewriteOutcome, HealError> {
    if !path.exists() {
        return Err(HealError::MappingNotFound(path.to_path_buf()));
    }

    let mapping = LogicalMapping::load(path)?;
    let outcome = apply(changes, &mapping);
    if outcome.changed() {
        outcome.mapping.save(path)?;
    }
    Ok(outcome)
}
