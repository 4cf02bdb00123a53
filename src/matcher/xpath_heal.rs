use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::matcher::matcher::MatchCandidate;
use crate::matcher::selector::SelectorKind;
use crate::scoring::config::ScoringConfig;
use crate::scoring::scorer::{ScoreBreakdown, ScoreContext, SimilarityScorer};
use crate::snapshot::document::{SnapshotDocument, XPathDocument};
use crate::snapshot::element::ElementRecord;

static CONTAINS_PREDICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"contains\(\s*@(class|id|name)\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)"#)
        .expect("contains-predicate pattern is valid")
});

pub fn has_contains_predicates(xpath: &str) -> bool {
    CONTAINS_PREDICATE.is_match(xpath)
}

enum LiveValue {
    /// Some element still carries the literal; the predicate still works.
    StillPresent,
    Replacement { value: String, score: f64 },
    Nothing,
}

/// Best live value of `attr` in the document for an old predicate literal.
fn best_live_value(
    attr: &str,
    literal: &str,
    quote: char,
    elements: &[ElementRecord],
    logical_name: Option<&str>,
    scorer: &SimilarityScorer<'_>,
) -> LiveValue {
    let mut best: Option<(String, f64)> = None;

    for element in elements {
        let Some(raw) = element.present(attr) else {
            continue;
        };
        if raw.contains(literal) {
            return LiveValue::StillPresent;
        }

        let values: Vec<&str> = if attr == "class" {
            raw.split_whitespace().collect()
        } else {
            vec![raw]
        };

        for value in values.into_iter().filter(|v| !v.contains(quote)) {
            let score = scorer.score(literal, value, ScoreContext::new(logical_name, Some(element)));
            if best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((value.to_string(), score));
            }
        }
    }

    match best {
        Some((value, score)) => LiveValue::Replacement { value, score },
        None => LiveValue::Nothing,
    }
}

/// Rewrite the literals of `contains(@class|id|name, '…')` predicates to the
/// closest live attribute values, then accept the new path only if it still
/// selects an unclaimed node. Paths without such predicates are unhealable.
pub fn heal_xpath_predicates(
    xpath: &str,
    elements: &[ElementRecord],
    logical_name: Option<&str>,
    excluded: &HashSet<usize>,
    config: &ScoringConfig,
) -> Option<MatchCandidate> {
    if !has_contains_predicates(xpath) {
        debug!(xpath, "xpath has no contains() predicate, not healable");
        return None;
    }

    let threshold = if xpath.trim_start().starts_with("//") {
        config.thresholds.xpath_predicate_relative
    } else {
        config.thresholds.xpath_predicate_absolute
    };
    let scorer = SimilarityScorer::new(&config.weights);

    let mut rewritten = String::with_capacity(xpath.len());
    let mut cursor = 0;
    let mut scores = Vec::new();

    for caps in CONTAINS_PREDICATE.captures_iter(xpath) {
        let attr = &caps[1];
        let (literal, quote) = match (caps.get(2), caps.get(3)) {
            (Some(m), _) => (m, '\''),
            (None, Some(m)) => (m, '"'),
            (None, None) => continue,
        };

        rewritten.push_str(&xpath[cursor..literal.start()]);
        match best_live_value(attr, literal.as_str(), quote, elements, logical_name, &scorer) {
            LiveValue::Replacement { value, score } if score >= threshold => {
                debug!(attr, old = literal.as_str(), new = %value, score, "predicate literal replaced");
                rewritten.push_str(&value);
                scores.push(score);
            }
            _ => rewritten.push_str(literal.as_str()),
        }
        cursor = literal.end();
    }
    rewritten.push_str(&xpath[cursor..]);

    if scores.is_empty() {
        return None;
    }

    let document = SnapshotDocument::new(elements);
    let hits = match document.select(&rewritten) {
        Ok(hits) => hits,
        Err(e) => {
            debug!(xpath = %rewritten, error = %e, "rewritten xpath cannot be evaluated");
            return None;
        }
    };
    let Some(source_index) = hits.into_iter().find(|idx| !excluded.contains(idx)) else {
        debug!(xpath = %rewritten, "rewritten xpath selects no unclaimed node");
        return None;
    };

    let score = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(MatchCandidate {
        score,
        proposed_selector: rewritten,
        element: elements[source_index].clone(),
        kind: SelectorKind::Xpath,
        source_index,
        breakdown: ScoreBreakdown {
            base: score,
            boosts: vec![],
            total: score,
        },
    })
}
