mod common;

use std::collections::HashSet;

use dom_heal::matcher::matcher::SelectorMatcher;
use dom_heal::matcher::selector::SelectorKind;
use dom_heal::matcher::xpath_heal::heal_xpath_predicates;
use dom_heal::scoring::config::ScoringConfig;

use crate::common::builders::{el, match_one};

// =========================================================================
// Renamed attributes
// =========================================================================

#[test]
fn renamed_id_matches_logical_name() {
    let after = vec![el("button", "/html/body/button[1]").with_id("btnEnviar").with_class("btn")];
    let hit = match_one("#botaoEnviar", "btnEnviar", &after).expect("should heal");
    assert_eq!(hit.proposed_selector, "#btnEnviar");
    assert_eq!(hit.kind, SelectorKind::Id);
    assert_eq!(hit.source_index, 0);
}

#[test]
fn id_selector_falls_back_to_name() {
    let after = vec![el("input", "/html/body/input[1]").with_name("email").with_class("input-email")];
    let hit = match_one("#emailInput", "inputEmail", &after).expect("should heal by name");
    assert_eq!(hit.proposed_selector, "[name=\"email\"]");
    assert_eq!(hit.kind, SelectorKind::Name);
}

#[test]
fn class_typo_is_healed() {
    let after = vec![el("div", "/html/body/div[1]").with_class("alert-success")];
    let hit = match_one(".alerta-success", "alertaSucesso", &after).expect("should heal by class");
    assert_eq!(hit.proposed_selector, ".alert-success");
    assert!(hit.score >= 0.70);
}

#[test]
fn translated_name_is_healed() {
    let after = vec![el("input", "/html/body/input[1]").with_name("usuario").with_class("user-form")];
    let hit = match_one("#userInput", "inputUsuario", &after).expect("should heal by translation");
    assert_eq!(hit.proposed_selector, "[name=\"usuario\"]");
}

#[test]
fn unrelated_elements_are_not_matched() {
    let after = vec![el("h1", "/html/body/h1[1]").with_id("header").with_class("destaque")];
    assert!(match_one("#tituloAntigo", "titulo", &after).is_none());
}

// =========================================================================
// Priority and tie-breaks
// =========================================================================

#[test]
fn id_equal_to_logical_name_beats_classes() {
    let after = vec![
        el("input", "/html/body/input[1]").with_id("campoNome").with_class("nome-novo"),
        el("input", "/html/body/input[2]").with_class("nome-campo"),
    ];
    let hit = match_one(".nome-antigo", "campoNome", &after).unwrap();
    assert_eq!(hit.proposed_selector, "#campoNome");
}

#[test]
fn id_equal_to_logical_name_beats_identical_class() {
    let after = vec![
        el("button", "/html/body/button[1]").with_id("acao").with_class("acao"),
        el("button", "/html/body/button[2]").with_class("acao"),
    ];
    let hit = match_one(".acao-antiga", "acao", &after).unwrap();
    assert_eq!(hit.proposed_selector, "#acao");
}

#[test]
fn equal_fuzzy_scores_prefer_id_over_class() {
    let after = vec![
        el("div", "/html/body/div[1]").with_class("alerta-successo"),
        el("div", "/html/body/div[2]").with_id("alerta-successo"),
    ];

    let config = ScoringConfig::default();
    let matcher = SelectorMatcher::new(&config);
    let none = HashSet::new();
    let class = matcher.qualifying_candidates(SelectorKind::Class, "alerta-sucesso", &after, Some("aviso"), &none);
    let id = matcher.qualifying_candidates(SelectorKind::Id, "alerta-sucesso", &after, Some("aviso"), &none);
    assert_eq!(class.len(), 1);
    assert_eq!(id.len(), 1);
    assert_eq!(class[0].score, id[0].score, "fixture must tie");

    let hit = match_one(".alerta-sucesso", "aviso", &after).unwrap();
    assert_eq!(hit.proposed_selector, "#alerta-successo");
    assert_eq!(hit.kind, SelectorKind::Id);
    assert_eq!(hit.source_index, 1);
}

#[test]
fn exact_id_wins_over_earlier_fuzzy_candidates() {
    let after = vec![
        el("input", "/html/body/input[1]").with_name("email").with_class("email"),
        el("input", "/html/body/input[2]").with_id("emai1"),
        el("input", "/html/body/input[3]").with_id("email"),
    ];
    let hit = match_one("#email", "campoEmail", &after).unwrap();
    assert_eq!(hit.proposed_selector, "#email");
    assert_eq!(hit.source_index, 2);
    assert_eq!(hit.score, 1.0);
}

// =========================================================================
// Exclusion
// =========================================================================

#[test]
fn claimed_elements_are_never_reused() {
    let config = ScoringConfig::default();
    let matcher = SelectorMatcher::new(&config);
    let after = vec![
        el("input", "/input[1]").with_id("email").with_class("email"),
        el("input", "/input[2]").with_id("emailConf").with_class("email-confirm"),
    ];

    let mut excluded = HashSet::new();
    let first = matcher
        .find_match(".email", &after, Some("campoEmail"), &excluded)
        .unwrap();
    assert_eq!(first.proposed_selector, "#email");
    excluded.insert(first.source_index);

    let second = matcher
        .find_match(".email-confirm", &after, Some("campoEmailConfirmacao"), &excluded)
        .unwrap();
    assert_eq!(second.source_index, 1);
    assert_ne!(second.proposed_selector, "#email");
}

#[test]
fn excluded_exact_match_is_skipped() {
    let config = ScoringConfig::default();
    let matcher = SelectorMatcher::new(&config);
    let after = vec![el("button", "/b[1]").with_id("btnEnviar")];
    let excluded: HashSet<usize> = [0].into_iter().collect();
    assert!(matcher.find_match("#btnEnviar", &after, Some("btnEnviar"), &excluded).is_none());
}

// =========================================================================
// Thresholds
// =========================================================================

#[test]
fn lowering_a_threshold_only_adds_candidates() {
    let after = vec![
        el("div", "/div[1]").with_class("alert-success"),
        el("div", "/div[2]").with_class("alerta"),
        el("div", "/div[3]").with_class("aviso-sucesso"),
        el("div", "/div[4]").with_class("footer"),
    ];
    let none = HashSet::new();

    let strict = ScoringConfig::default();
    let mut loose = ScoringConfig::default();
    loose.thresholds.class = 0.3;

    let strict_hits: Vec<_> = SelectorMatcher::new(&strict)
        .qualifying_candidates(SelectorKind::Class, "alerta-success", &after, None, &none)
        .into_iter()
        .map(|c| c.proposed_selector)
        .collect();
    let loose_hits: Vec<_> = SelectorMatcher::new(&loose)
        .qualifying_candidates(SelectorKind::Class, "alerta-success", &after, None, &none)
        .into_iter()
        .map(|c| c.proposed_selector)
        .collect();

    assert!(!strict_hits.is_empty());
    assert!(loose_hits.len() >= strict_hits.len());
    for hit in &strict_hits {
        assert!(loose_hits.contains(hit), "{hit} dropped by a lower threshold");
    }
}

// =========================================================================
// XPath predicates
// =========================================================================

#[test]
fn contains_predicate_literal_is_rewritten() {
    let after = vec![
        el("h1", "/html/body/h1[1]").with_class("titulo"),
        el("div", "/html/body/div[1]").with_class("alert-success"),
    ];
    let hit = match_one("//div[contains(@class,'alerta-success')]", "alertaSucesso", &after)
        .expect("predicate should be healed");
    assert_eq!(hit.proposed_selector, "//div[contains(@class,'alert-success')]");
    assert_eq!(hit.kind, SelectorKind::Xpath);
    assert_eq!(hit.source_index, 1);
}

#[test]
fn xpath_without_predicates_is_not_healable() {
    let after = vec![el("div", "/html/body/div[1]").with_id("x")];
    assert!(match_one("/html/body/div[7]", "bloco", &after).is_none());
}

#[test]
fn still_valid_predicate_is_left_alone() {
    let after = vec![el("div", "/html/body/div[1]").with_class("alert alert-success")];
    let none = HashSet::new();
    let config = ScoringConfig::default();
    assert!(
        heal_xpath_predicates("//div[contains(@class,'alert-success')]", &after, None, &none, &config).is_none()
    );
}

#[test]
fn rewritten_predicate_must_select_an_unclaimed_node() {
    let after = vec![el("div", "/html/body/div[1]").with_class("alert-success")];
    let claimed: HashSet<usize> = [0].into_iter().collect();
    let config = ScoringConfig::default();
    assert!(
        heal_xpath_predicates("//div[contains(@class,'alerta-success')]", &after, None, &claimed, &config).is_none()
    );
}
