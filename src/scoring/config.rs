use serde::{Deserialize, Serialize};

use crate::matcher::selector::SelectorKind;

// ============================================================================
// Scoring policy
// ============================================================================
//
// Every threshold and weight the healer uses lives here. The defaults are the
// canonical policy; a `scoring:` section in dom-heal.yaml overrides any subset.

/// Minimum score a candidate must reach for each selector kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindThresholds {
    pub id: f64,
    pub name: f64,
    pub class: f64,
    pub xpath: f64,

    /// `contains(@attr, '…')` literal replacement inside a `//` path
    pub xpath_predicate_relative: f64,

    /// `contains(@attr, '…')` literal replacement inside a `/html/...` path
    pub xpath_predicate_absolute: f64,
}

impl Default for KindThresholds {
    fn default() -> Self {
        Self {
            id: 0.60,
            name: 0.60,
            class: 0.70,
            xpath: 0.80,
            xpath_predicate_relative: 0.55,
            xpath_predicate_absolute: 0.70,
        }
    }
}

impl KindThresholds {
    pub fn for_kind(&self, kind: SelectorKind) -> f64 {
        match kind {
            SelectorKind::Id => self.id,
            SelectorKind::Name => self.name,
            SelectorKind::Class => self.class,
            SelectorKind::Xpath => self.xpath,
        }
    }
}

/// Additive terms layered on top of the base similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostWeights {
    pub ratio: f64,
    pub token_sort: f64,
    pub partial: f64,

    pub exact: f64,
    pub prefix: f64,
    pub suffix: f64,
    pub substring: f64,
    pub one_char_edit: f64,
    pub token_set: f64,
    pub separator: f64,
    pub translation_prefix: f64,
    pub translation_contained: f64,
    pub domain_keyword: f64,
    pub tag_button: f64,
    pub tag_field: f64,
    pub class_contains_value: f64,
    pub class_contains_logical_name: f64,
    pub generic_class_penalty: f64,

    /// Shortest half-length prefix/suffix the affix boosts accept
    pub min_affix_len: usize,
}

impl Default for BoostWeights {
    fn default() -> Self {
        Self {
            ratio: 0.22,
            token_sort: 0.19,
            partial: 0.16,
            exact: 0.22,
            prefix: 0.18,
            suffix: 0.18,
            substring: 0.12,
            one_char_edit: 0.20,
            token_set: 0.24,
            separator: 0.18,
            translation_prefix: 0.22,
            translation_contained: 0.12,
            domain_keyword: 0.18,
            tag_button: 0.14,
            tag_field: 0.12,
            class_contains_value: 0.13,
            class_contains_logical_name: 0.11,
            generic_class_penalty: 0.20,
            min_affix_len: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub thresholds: KindThresholds,
    pub weights: BoostWeights,
}
