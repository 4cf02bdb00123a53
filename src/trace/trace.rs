use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::matcher::matcher::MatchCandidate;
use crate::matcher::selector::SelectorKind;

/// What happened to one mapping entry during a healing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    /// A different selector was proposed
    Healed,
    /// The best match is the selector already in use
    Unchanged,
    NoMatch,
}

/// One JSONL line of the decision trace.
#[derive(Debug, Serialize)]
pub struct HealTraceEvent {
    pub timestamp_ms: u128,

    pub logical_name: String,
    pub old_selector: String,
    pub outcome: TraceOutcome,

    pub proposed_selector: Option<String>,
    pub score: Option<f64>,
    pub kind: Option<SelectorKind>,
    pub reason: Option<String>,
}

impl HealTraceEvent {
    pub fn now(logical_name: &str, old_selector: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            logical_name: logical_name.to_string(),
            old_selector: old_selector.to_string(),
            outcome: TraceOutcome::NoMatch,
            proposed_selector: None,
            score: None,
            kind: None,
            reason: None,
        }
    }

    pub fn with_match(mut self, candidate: &MatchCandidate) -> Self {
        self.outcome = if candidate.proposed_selector == self.old_selector {
            TraceOutcome::Unchanged
        } else {
            TraceOutcome::Healed
        };
        self.proposed_selector = Some(candidate.proposed_selector.clone());
        self.score = Some(candidate.score);
        self.kind = Some(candidate.kind);
        self.reason = Some(candidate.reason());
        self
    }
}
