mod common;

use std::collections::BTreeMap;

use dom_heal::diff::diff_model::{AttributeChange, DiffResult, ModifiedElement, MoveIdentity, MovedElement};
use dom_heal::diff::differ::{diff, DiffOptions};
use dom_heal::error::HealError;
use dom_heal::heal::healer::{HealingReport, SelectorChange};
use dom_heal::heal::mapping::LogicalMapping;
use dom_heal::heal::rewriter::{apply, rewrite_mapping_file, ChangeSet, SelectorEdit};

use crate::common::builders::{el, mapping};

fn change(name: &str, old: &str, new: &str) -> SelectorChange {
    SelectorChange {
        logical_name: name.into(),
        old_selector: old.into(),
        new_selector: new.into(),
        score: 0.9,
        reason: "matching_id_0.90".into(),
        xpath: None,
        tag: None,
    }
}

// =========================================================================
// From a healing report
// =========================================================================

#[test]
fn healing_report_updates_entries() {
    let report = HealingReport {
        changes: vec![change("btnEnviar", "#botaoEnviar", "#btnEnviar")],
    };
    let before = mapping(&[("btnEnviar", "#botaoEnviar"), ("titulo", "#titulo")]);

    let outcome = apply(&ChangeSet::from_healing(&report), &before);
    assert_eq!(outcome.mapping.get("btnEnviar"), Some("#btnEnviar"));
    assert_eq!(outcome.mapping.get("titulo"), Some("#titulo"));
    assert_eq!(outcome.log.len(), 1);
    assert_eq!(outcome.log[0].to_string(), "btnEnviar: #botaoEnviar -> #btnEnviar");
}

#[test]
fn applying_twice_changes_nothing_the_second_time() {
    let report = HealingReport {
        changes: vec![
            change("a", "#a", "#a2"),
            change("b", ".b", "[name=\"b\"]"),
        ],
    };
    let changes = ChangeSet::from_healing(&report);
    let first = apply(&changes, &mapping(&[("a", "#a"), ("b", ".b")]));
    assert_eq!(first.log.len(), 2);

    let second = apply(&changes, &first.mapping);
    assert!(!second.changed());
    assert_eq!(second.mapping, first.mapping);
}

// =========================================================================
// From a structural diff
// =========================================================================

#[test]
fn diff_moves_removals_and_renames_become_edits() {
    let before = vec![
        el("div", "/html/body/div[1]").with_id("painel"),
        el("button", "/html/body/button[1]").with_id("btnVelho"),
        el("input", "/html/body/input[1]").with_name("email").with_class("campo campo-email"),
        el("span", "/html/body/span[1]").with_class("aviso"),
    ];

    let mut class_change = BTreeMap::new();
    class_change.insert(
        "class".to_string(),
        AttributeChange {
            before: Some("campo campo-email".into()),
            after: Some("campo campo-mail".into()),
        },
    );
    let mut name_change = BTreeMap::new();
    name_change.insert(
        "name".to_string(),
        AttributeChange {
            before: Some("email".into()),
            after: Some("e-mail".into()),
        },
    );

    let diff = DiffResult {
        moved: vec![MovedElement {
            identity: MoveIdentity::Id("painel".into()),
            from: "/html/body/div[1]".into(),
            to: "/html/body/main[1]/div[1]".into(),
        }],
        removed: vec!["/html/body/button[1]".into()],
        added: vec!["/html/body/a[1]".into()],
        modified: vec![
            ModifiedElement {
                xpath: "/html/body/input[1]".into(),
                changes: class_change,
            },
            ModifiedElement {
                xpath: "/html/body/input[1]".into(),
                changes: name_change,
            },
        ],
    };

    let logical = mapping(&[
        ("painel", "/html/body/div[1]"),
        ("btnVelho", "#btnVelho"),
        ("campoEmail", ".campo-email"),
        ("emailPorNome", "[name=\"email\"]"),
        ("aviso", ".aviso"),
    ]);

    let changes = ChangeSet::from_diff(&diff, &before, &logical);
    assert_eq!(
        changes.edits,
        vec![
            SelectorEdit::Update {
                logical_name: "painel".into(),
                selector: "/html/body/main[1]/div[1]".into(),
            },
            SelectorEdit::Remove {
                logical_name: "btnVelho".into(),
            },
            SelectorEdit::Update {
                logical_name: "campoEmail".into(),
                selector: ".campo-mail".into(),
            },
            SelectorEdit::Update {
                logical_name: "emailPorNome".into(),
                selector: "[name=\"e-mail\"]".into(),
            },
        ]
    );

    let outcome = apply(&changes, &logical);
    assert_eq!(outcome.mapping.len(), 4);
    assert_eq!(outcome.mapping.get("btnVelho"), None);
    assert_eq!(outcome.mapping.get("aviso"), Some(".aviso"));

    let again = apply(&changes, &outcome.mapping);
    assert!(!again.changed());

    let rederived = ChangeSet::from_diff(&diff, &before, &outcome.mapping);
    let rerun = apply(&rederived, &outcome.mapping);
    assert!(!rerun.changed(), "unexpected edits: {:?}", rerun.log);
    assert_eq!(rerun.mapping, outcome.mapping);
}

#[test]
fn class_shared_by_a_surviving_element_is_kept() {
    let before = vec![
        el("button", "/html/body/form[1]/button[1]").with_class("btn"),
        el("button", "/html/body/div[1]/button[1]").with_class("btn"),
    ];
    let diff = DiffResult {
        removed: vec!["/html/body/form[1]/button[1]".into()],
        ..DiffResult::default()
    };
    let logical = mapping(&[("botoes", ".btn")]);
    assert!(ChangeSet::from_diff(&diff, &before, &logical).is_empty());
}

#[test]
fn class_whose_every_carrier_was_removed_is_deleted() {
    let before = vec![
        el("button", "/html/body/form[1]/button[1]").with_class("btn"),
        el("button", "/html/body/div[1]/button[1]").with_class("btn"),
        el("p", "/html/body/p[1]").with_class("texto"),
    ];
    let diff = DiffResult {
        removed: vec![
            "/html/body/form[1]/button[1]".into(),
            "/html/body/div[1]/button[1]".into(),
        ],
        ..DiffResult::default()
    };
    let logical = mapping(&[("botoes", ".btn"), ("texto", ".texto")]);
    assert_eq!(
        ChangeSet::from_diff(&diff, &before, &logical).edits,
        vec![SelectorEdit::Remove {
            logical_name: "botoes".into(),
        }]
    );
}

#[test]
fn entry_of_an_element_displaced_by_an_id_move_is_deleted() {
    let before = vec![el("div", "/a").with_id("X"), el("div", "/b").with_id("Z")];
    let after = vec![el("div", "/b").with_id("X")];
    let result = diff(&before, &after, &DiffOptions::default());

    let logical = mapping(&[("x", "/a"), ("z", "#Z")]);
    assert_eq!(
        ChangeSet::from_diff(&result, &before, &logical).edits,
        vec![
            SelectorEdit::Update {
                logical_name: "x".into(),
                selector: "/b".into(),
            },
            SelectorEdit::Remove {
                logical_name: "z".into(),
            },
        ]
    );
}

#[test]
fn added_elements_never_create_entries() {
    let diff = DiffResult {
        added: vec!["/html/body/a[1]".into()],
        ..DiffResult::default()
    };
    let logical = mapping(&[("link", "#link")]);
    assert!(ChangeSet::from_diff(&diff, &[], &logical).is_empty());
}

// =========================================================================
// Mapping files
// =========================================================================

#[test]
fn rewrite_keeps_list_shape_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elementos.json");
    std::fs::write(
        &path,
        r##"[{"nome": "zeta", "selector": "#z"}, {"nome": "alfa", "selector": "#a", "obs": "login"}]"##,
    )
    .unwrap();

    let changes = ChangeSet {
        edits: vec![SelectorEdit::Update {
            logical_name: "alfa".into(),
            selector: "#alfa".into(),
        }],
    };
    let outcome = rewrite_mapping_file(&path, &changes).unwrap();
    assert!(outcome.changed());

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        written,
        serde_json::json!([
            {"nome": "zeta", "selector": "#z"},
            {"nome": "alfa", "selector": "#alfa", "obs": "login"}
        ])
    );

    let reloaded = LogicalMapping::load(&path).unwrap();
    assert_eq!(reloaded.entries[0].logical_name, "zeta");
}

#[test]
fn rewrite_of_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nao-existe.json");
    let result = rewrite_mapping_file(&path, &ChangeSet::default());
    assert!(matches!(result, Err(HealError::MappingNotFound(p)) if p == path));
}

#[test]
fn malformed_mapping_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quebrado.json");
    std::fs::write(&path, "{ nope").unwrap();

    let err = LogicalMapping::load(&path).unwrap_err();
    assert!(matches!(err, HealError::MappingParse { .. }));
    assert!(err.to_string().contains("quebrado.json"));
}
