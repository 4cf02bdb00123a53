use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::matcher::selector::{format_selector, parse_selector, SelectorKind};
use crate::matcher::xpath_heal::heal_xpath_predicates;
use crate::scoring::config::ScoringConfig;
use crate::scoring::keywords::is_ignored_class_token;
use crate::scoring::scorer::{ScoreBreakdown, ScoreContext, SimilarityScorer};
use crate::snapshot::element::ElementRecord;

/// A proposed replacement for one old selector. Lives for one matching call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub score: f64,
    pub proposed_selector: String,
    pub element: ElementRecord,
    pub kind: SelectorKind,
    /// Position of `element` in the snapshot; the caller must exclude it
    /// from every later call in the same healing run.
    pub source_index: usize,
    pub breakdown: ScoreBreakdown,
}

impl MatchCandidate {
    /// Short audit string, e.g. `matching_id_0.87`.
    pub fn reason(&self) -> String {
        format!("matching_{}_{:.2}", self.kind, self.score)
    }
}

/// Attribute values an element offers for a selector kind. A class
/// attribute offers each of its tokens, minus layout/utility ones.
pub fn candidate_values(element: &ElementRecord, kind: SelectorKind) -> Vec<&str> {
    match kind {
        SelectorKind::Id => element.present("id").into_iter().collect(),
        SelectorKind::Name => element.present("name").into_iter().collect(),
        SelectorKind::Class => element
            .class_tokens()
            .filter(|t| !is_ignored_class_token(t))
            .collect(),
        SelectorKind::Xpath => element.present("xpath").into_iter().collect(),
    }
}

/// Higher score first, then kind priority (id > name > class > xpath),
/// then document order.
pub fn rank(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.kind.priority().cmp(&a.kind.priority()))
        .then_with(|| a.source_index.cmp(&b.source_index))
}

pub fn pick_best(candidates: Vec<MatchCandidate>) -> Option<MatchCandidate> {
    candidates.into_iter().min_by(rank)
}

pub struct SelectorMatcher<'c> {
    config: &'c ScoringConfig,
}

impl<'c> SelectorMatcher<'c> {
    pub fn new(config: &'c ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.config
    }

    /// Best replacement for `old_selector` among `candidates`, skipping
    /// every index in `excluded`. `None` is the ordinary "nothing close
    /// enough" outcome.
    pub fn find_match(
        &self,
        old_selector: &str,
        candidates: &[ElementRecord],
        logical_name: Option<&str>,
        excluded: &HashSet<usize>,
    ) -> Option<MatchCandidate> {
        let parsed = parse_selector(old_selector);

        if parsed.kind == SelectorKind::Xpath {
            return heal_xpath_predicates(&parsed.value, candidates, logical_name, excluded, self.config);
        }
        if parsed.value.is_empty() {
            return None;
        }

        // Exact hits end the search, strongest kind first.
        for kind in SelectorKind::PRIORITY {
            if let Some(hit) = self.exact_match(kind, &parsed.value, candidates, logical_name, excluded) {
                debug!(selector = old_selector, kind = %kind, index = hit.source_index, "exact match");
                return Some(hit);
            }
        }

        // One pool over every kind, so equal scores fall back on kind priority.
        let pool: Vec<MatchCandidate> = SelectorKind::PRIORITY
            .into_iter()
            .flat_map(|kind| self.qualifying_candidates(kind, &parsed.value, candidates, logical_name, excluded))
            .collect();
        if let Some(best) = pick_best(pool) {
            debug!(selector = old_selector, kind = %best.kind, score = best.score, "fuzzy match");
            return Some(best);
        }

        debug!(selector = old_selector, "no candidate cleared any threshold");
        None
    }

    /// First unclaimed element whose `kind` value equals the bare value or
    /// the logical name.
    pub fn exact_match(
        &self,
        kind: SelectorKind,
        value: &str,
        candidates: &[ElementRecord],
        logical_name: Option<&str>,
        excluded: &HashSet<usize>,
    ) -> Option<MatchCandidate> {
        candidates
            .iter()
            .enumerate()
            .filter(|(idx, _)| !excluded.contains(idx))
            .find_map(|(idx, element)| {
                candidate_values(element, kind)
                    .into_iter()
                    .find(|v| *v == value || Some(*v) == logical_name)
                    .map(|v| MatchCandidate {
                        score: 1.0,
                        proposed_selector: format_selector(kind, v),
                        element: element.clone(),
                        kind,
                        source_index: idx,
                        breakdown: ScoreBreakdown::exact(),
                    })
            })
    }

    /// Every unclaimed `(element, value)` of `kind` whose score clears that
    /// kind's threshold, in document order.
    pub fn qualifying_candidates(
        &self,
        kind: SelectorKind,
        value: &str,
        candidates: &[ElementRecord],
        logical_name: Option<&str>,
        excluded: &HashSet<usize>,
    ) -> Vec<MatchCandidate> {
        let scorer = SimilarityScorer::new(&self.config.weights);
        let threshold = self.config.thresholds.for_kind(kind);
        let mut qualifying = Vec::new();

        for (idx, element) in candidates.iter().enumerate() {
            if excluded.contains(&idx) {
                continue;
            }
            for candidate in candidate_values(element, kind) {
                let ctx = ScoreContext::new(logical_name, Some(element));
                let breakdown = scorer.breakdown(value, candidate, ctx);
                if breakdown.total >= threshold {
                    qualifying.push(MatchCandidate {
                        score: breakdown.total,
                        proposed_selector: format_selector(kind, candidate),
                        element: element.clone(),
                        kind,
                        source_index: idx,
                        breakdown,
                    });
                }
            }
        }
        qualifying
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: SelectorKind, score: f64, idx: usize) -> MatchCandidate {
        MatchCandidate {
            score,
            proposed_selector: format!("{kind}-{idx}"),
            element: ElementRecord::new("div", &format!("/div[{}]", idx + 1)),
            kind,
            source_index: idx,
            breakdown: ScoreBreakdown::exact(),
        }
    }

    #[test]
    fn ties_prefer_id_over_class() {
        let best = pick_best(vec![
            candidate(SelectorKind::Class, 0.8, 0),
            candidate(SelectorKind::Id, 0.8, 1),
        ])
        .unwrap();
        assert_eq!(best.kind, SelectorKind::Id);
    }

    #[test]
    fn higher_score_beats_priority() {
        let best = pick_best(vec![
            candidate(SelectorKind::Id, 0.7, 0),
            candidate(SelectorKind::Class, 0.9, 1),
        ])
        .unwrap();
        assert_eq!(best.kind, SelectorKind::Class);
    }

    #[test]
    fn full_ties_keep_document_order() {
        let best = pick_best(vec![
            candidate(SelectorKind::Name, 0.75, 4),
            candidate(SelectorKind::Name, 0.75, 2),
        ])
        .unwrap();
        assert_eq!(best.source_index, 2);
    }

    #[test]
    fn layout_class_tokens_are_not_candidates() {
        let el = ElementRecord::new("div", "/div[1]").with_class("container row alert-box d-none");
        assert_eq!(candidate_values(&el, SelectorKind::Class), vec!["alert-box"]);
    }

    #[test]
    fn reason_formats_kind_and_score() {
        assert_eq!(candidate(SelectorKind::Id, 0.8666, 0).reason(), "matching_id_0.87");
    }
}
