use serde::Serialize;

use crate::scoring::config::BoostWeights;
use crate::scoring::keywords::{
    translate, BUTTON_HINTS, BUTTON_TAGS, DOMAIN_KEYWORDS, FIELD_HINTS, FIELD_TAGS,
    GENERIC_CLASS_WORDS,
};
use crate::scoring::similarity::{
    half_prefix, half_suffix, is_single_char_edit, normalize_separators, partial_ratio, ratio,
    token_sort_ratio, word_tokens,
};
use crate::snapshot::element::ElementRecord;

/// Optional hints that let the scorer go beyond lexical comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreContext<'a> {
    pub logical_name: Option<&'a str>,
    pub element: Option<&'a ElementRecord>,
}

impl<'a> ScoreContext<'a> {
    pub fn new(logical_name: Option<&'a str>, element: Option<&'a ElementRecord>) -> Self {
        Self {
            logical_name,
            element,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Boost {
    Exact,
    Prefix,
    Suffix,
    Substring,
    OneCharEdit,
    TokenSet,
    Separator,
    Translation,
    DomainKeyword,
    TagRole,
    ClassContainment,
    GenericClassPenalty,
}

/// Why a candidate scored what it scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub boosts: Vec<(Boost, f64)>,
    /// `base + sum(boosts)`, clamped to `[0, 1]`
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn exact() -> Self {
        Self {
            base: 1.0,
            boosts: vec![],
            total: 1.0,
        }
    }

    pub fn boost(&self, kind: Boost) -> f64 {
        self.boosts
            .iter()
            .filter(|(b, _)| *b == kind)
            .map(|(_, v)| v)
            .sum()
    }
}

pub struct SimilarityScorer<'w> {
    weights: &'w BoostWeights,
}

impl<'w> SimilarityScorer<'w> {
    pub fn new(weights: &'w BoostWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, old_value: &str, candidate: &str, ctx: ScoreContext<'_>) -> f64 {
        self.breakdown(old_value, candidate, ctx).total
    }

    pub fn breakdown(&self, old_value: &str, candidate: &str, ctx: ScoreContext<'_>) -> ScoreBreakdown {
        let w = self.weights;
        let old = old_value.to_lowercase();
        let cand = candidate.to_lowercase();
        let logical = ctx.logical_name.map(str::to_lowercase);

        let base = w.ratio * ratio(&old, &cand)
            + w.token_sort * token_sort_ratio(&old, &cand)
            + w.partial * partial_ratio(&old, &cand);

        let mut boosts = Vec::new();
        let mut add = |kind: Boost, value: f64| {
            if value != 0.0 {
                boosts.push((kind, value));
            }
        };

        if old == cand {
            add(Boost::Exact, w.exact);
        }

        let prefix_hit = cand.starts_with(&old)
            || half_prefix(&old, w.min_affix_len).is_some_and(|p| cand.starts_with(p));
        if prefix_hit {
            add(Boost::Prefix, w.prefix);
        }

        if half_suffix(&old, w.min_affix_len).is_some_and(|s| cand.ends_with(s)) {
            add(Boost::Suffix, w.suffix);
        }

        if !old.is_empty() && !cand.is_empty() && (cand.contains(&old) || old.contains(&cand)) {
            add(Boost::Substring, w.substring);
        }

        if is_single_char_edit(&old, &cand) {
            add(Boost::OneCharEdit, w.one_char_edit);
        }

        if same_word_set(old_value, candidate) {
            add(Boost::TokenSet, w.token_set);
        }

        if normalize_separators(&old) == normalize_separators(&cand) {
            add(Boost::Separator, w.separator);
        }

        add(Boost::Translation, self.translation_boost(old_value, &cand));

        if let Some(logical) = logical.as_deref() {
            let hits = DOMAIN_KEYWORDS
                .iter()
                .filter(|kw| logical.contains(*kw) && cand.contains(*kw))
                .count();
            add(Boost::DomainKeyword, hits as f64 * w.domain_keyword);
        }

        if let (Some(logical), Some(element)) = (logical.as_deref(), ctx.element) {
            add(Boost::TagRole, self.tag_boost(logical, &element.tag));
        }

        if let Some(element) = ctx.element {
            let class = element.class.as_deref().unwrap_or("").to_lowercase();
            if !class.is_empty() {
                if !old.is_empty() && class.contains(&old) {
                    add(Boost::ClassContainment, w.class_contains_value);
                } else if logical.as_deref().is_some_and(|l| !l.is_empty() && class.contains(l)) {
                    add(Boost::ClassContainment, w.class_contains_logical_name);
                }
            }
        }

        if is_generic_class(&cand) {
            add(Boost::GenericClassPenalty, -w.generic_class_penalty);
        }

        let total = (base + boosts.iter().map(|(_, v)| v).sum::<f64>()).clamp(0.0, 1.0);

        ScoreBreakdown {
            base,
            boosts,
            total,
        }
    }

    /// Strongest of: a translated word of the old value starts the candidate,
    /// or appears anywhere in it.
    fn translation_boost(&self, old_value: &str, cand: &str) -> f64 {
        let mut best = 0.0f64;
        let words = word_tokens(old_value);
        let whole = old_value.to_lowercase();

        for word in words.iter().map(String::as_str).chain(std::iter::once(whole.as_str())) {
            let Some(translated) = translate(word) else {
                continue;
            };
            if cand.starts_with(translated) {
                best = best.max(self.weights.translation_prefix);
            } else if cand.contains(translated) {
                best = best.max(self.weights.translation_contained);
            }
        }
        best
    }

    fn tag_boost(&self, logical: &str, tag: &str) -> f64 {
        let tag = tag.to_lowercase();
        if BUTTON_HINTS.iter().any(|h| logical.contains(h)) && BUTTON_TAGS.contains(&tag.as_str()) {
            self.weights.tag_button
        } else if FIELD_HINTS.iter().any(|h| logical.contains(h)) && FIELD_TAGS.contains(&tag.as_str())
        {
            self.weights.tag_field
        } else {
            0.0
        }
    }
}

fn same_word_set(a: &str, b: &str) -> bool {
    use std::collections::BTreeSet;

    let wa: BTreeSet<String> = word_tokens(a).into_iter().collect();
    let wb: BTreeSet<String> = word_tokens(b).into_iter().collect();
    !wa.is_empty() && wa == wb
}

/// Any alphanumeric word of the value is a layout/utility class name.
pub fn is_generic_class(value: &str) -> bool {
    value
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GENERIC_CLASS_WORDS.contains(&word))
}
