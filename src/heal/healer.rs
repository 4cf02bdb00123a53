use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::heal::mapping::LogicalMapping;
use crate::matcher::matcher::SelectorMatcher;
use crate::scoring::config::ScoringConfig;
use crate::snapshot::element::ElementRecord;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::HealTraceEvent;

/// One healed selector, as written to `ElementosAlterados.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorChange {
    #[serde(rename = "nome")]
    pub logical_name: String,
    #[serde(rename = "selector_antigo")]
    pub old_selector: String,
    #[serde(rename = "novo_seletor")]
    pub new_selector: String,
    pub score: f64,
    /// `matching_<kind>_<score>`
    #[serde(rename = "motivo")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Result of one healing run. Serializes to `{}` when nothing changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealingReport {
    #[serde(rename = "alterados", default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<SelectorChange>,
}

impl HealingReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn change_for(&self, logical_name: &str) -> Option<&SelectorChange> {
        self.changes.iter().find(|c| c.logical_name == logical_name)
    }
}

/// Match every mapping entry, in mapping order, against `snapshot`.
///
/// Each snapshot element is claimed at most once per run, including by
/// entries whose selector turned out to be correct already.
pub fn heal_selectors(
    mapping: &LogicalMapping,
    snapshot: &[ElementRecord],
    config: &ScoringConfig,
    trace: &TraceLogger,
) -> HealingReport {
    let matcher = SelectorMatcher::new(config);
    let mut excluded: HashSet<usize> = HashSet::new();
    let mut report = HealingReport::default();

    for entry in &mapping.entries {
        let event = HealTraceEvent::now(&entry.logical_name, &entry.selector);

        let Some(candidate) = matcher.find_match(&entry.selector, snapshot, Some(&entry.logical_name), &excluded)
        else {
            debug!(logical_name = %entry.logical_name, selector = %entry.selector, "no match, selector left as is");
            trace.log(&event);
            continue;
        };

        excluded.insert(candidate.source_index);
        trace.log(&event.with_match(&candidate));

        if candidate.proposed_selector == entry.selector {
            continue;
        }

        info!(
            logical_name = %entry.logical_name,
            old = %entry.selector,
            new = %candidate.proposed_selector,
            score = candidate.score,
            kind = %candidate.kind,
            "selector healed"
        );
        report.changes.push(SelectorChange {
            logical_name: entry.logical_name.clone(),
            old_selector: entry.selector.clone(),
            new_selector: candidate.proposed_selector.clone(),
            score: candidate.score,
            reason: candidate.reason(),
            xpath: Some(candidate.element.xpath.clone()),
            tag: Some(candidate.element.tag.clone()).filter(|t| !t.is_empty()),
        });
    }

    report
}
