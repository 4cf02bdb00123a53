use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diff::diff_model::{AttributeChange, DiffResult, ModifiedElement, MoveIdentity, MovedElement};
use crate::scoring::similarity::ratio;
use crate::snapshot::element::{ElementRecord, WELL_KNOWN_ATTRIBUTES};

/// Knobs of the structural differ; the `diff:` section of dom-heal.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Attributes compared and fingerprinted. `None` means the well-known set.
    /// Discovered `data_*` keys are always appended.
    pub attributes: Option<Vec<String>>,

    /// Minimum fingerprint similarity for a fuzzy move
    pub threshold: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            attributes: None,
            threshold: 0.7,
        }
    }
}

/// Tracked attributes: the configured (or well-known) list followed by every
/// `data_*` key either snapshot carries, sorted.
pub fn tracked_attributes(
    before: &[ElementRecord],
    after: &[ElementRecord],
    configured: Option<&[String]>,
) -> Vec<String> {
    let mut attributes: Vec<String> = match configured {
        Some(list) => list.to_vec(),
        None => WELL_KNOWN_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
    };

    let discovered: BTreeSet<&str> = before
        .iter()
        .chain(after)
        .flat_map(|e| e.data_keys())
        .collect();

    for key in discovered {
        if !attributes.iter().any(|a| a == key) {
            attributes.push(key.to_string());
        }
    }
    attributes
}

/// Tag followed by every tracked attribute, missing ones as empty strings.
pub fn fingerprint(element: &ElementRecord, attributes: &[String]) -> String {
    std::iter::once(element.tag.as_str())
        .chain(attributes.iter().map(|a| element.attribute(a).unwrap_or("")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered `id -> xpath` over non-empty ids. A repeated id keeps its first
/// position but points at its last xpath.
fn id_index(snapshot: &[ElementRecord]) -> Vec<(&str, &str)> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for element in snapshot {
        let Some(id) = element.present("id") else {
            continue;
        };
        match seen.get(id) {
            Some(&pos) => order[pos].1 = &element.xpath,
            None => {
                seen.insert(id, order.len());
                order.push((id, &element.xpath));
            }
        }
    }
    order
}

/// Compare two snapshots and classify every element.
///
/// Elements are keyed by xpath. Removed/added pairs are first reconciled by
/// equal id, then greedily by fingerprint similarity: each removed element,
/// in document order, takes the first added element (in document order)
/// that clears the threshold.
pub fn diff(before: &[ElementRecord], after: &[ElementRecord], options: &DiffOptions) -> DiffResult {
    let attributes = tracked_attributes(before, after, options.attributes.as_deref());

    let before_map: HashMap<&str, &ElementRecord> = before.iter().map(|e| (e.xpath.as_str(), e)).collect();
    let after_map: HashMap<&str, &ElementRecord> = after.iter().map(|e| (e.xpath.as_str(), e)).collect();

    let mut removed: HashSet<&str> = before_map.keys().filter(|x| !after_map.contains_key(*x)).copied().collect();
    let mut added: HashSet<&str> = after_map.keys().filter(|x| !before_map.contains_key(*x)).copied().collect();
    let mut moved = Vec::new();

    // ---- Moves by id ----
    let after_ids: HashMap<&str, &str> = id_index(after).into_iter().collect();
    for (id, from) in id_index(before) {
        let Some(&to) = after_ids.get(id) else {
            continue;
        };
        if to != from {
            moved.push(MovedElement {
                identity: MoveIdentity::Id(id.to_string()),
                from: from.to_string(),
                to: to.to_string(),
            });
            removed.remove(from);
            added.remove(to);
        }
    }

    // An element that sat where an id move landed, and did not move away
    // by id itself, is gone from that xpath.
    let id_sources: HashSet<&str> = moved.iter().map(|m| m.from.as_str()).collect();
    let displaced: Vec<&str> = moved
        .iter()
        .map(|m| m.to.as_str())
        .filter(|to| !id_sources.contains(to))
        .filter_map(|to| before_map.get_key_value(to).map(|(xpath, _)| *xpath))
        .collect();
    for xpath in displaced {
        debug!(xpath, "element displaced by an id move");
        removed.insert(xpath);
    }

    // ---- Fuzzy moves ----
    let pending_before: Vec<&ElementRecord> = dedup_in_order(before).filter(|e| removed.contains(e.xpath.as_str())).collect();
    for old in pending_before {
        let old_print = fingerprint(old, &attributes);

        let hit = dedup_in_order(after)
            .filter(|e| added.contains(e.xpath.as_str()))
            .map(|e| (e, ratio(&old_print, &fingerprint(e, &attributes))))
            .find(|(_, score)| *score >= options.threshold);

        if let Some((new, score)) = hit {
            debug!(from = %old.xpath, to = %new.xpath, score, "fuzzy move");
            moved.push(MovedElement {
                identity: MoveIdentity::Similarity(score * 100.0),
                from: old.xpath.clone(),
                to: new.xpath.clone(),
            });
            removed.remove(old.xpath.as_str());
            added.remove(new.xpath.as_str());
        }
    }

    // ---- Attribute changes at stable xpaths ----
    let endpoints: HashSet<&str> = moved
        .iter()
        .flat_map(|m| [m.from.as_str(), m.to.as_str()])
        .collect();

    let modified = dedup_in_order(before)
        .filter(|e| !endpoints.contains(e.xpath.as_str()))
        .filter_map(|old| {
            let new = after_map.get(old.xpath.as_str())?;
            let old = before_map[old.xpath.as_str()];
            let changes: BTreeMap<String, AttributeChange> = attributes
                .iter()
                .filter_map(|attr| {
                    let b = old.attribute(attr);
                    let a = new.attribute(attr);
                    (b != a).then(|| {
                        (
                            attr.clone(),
                            AttributeChange {
                                before: b.map(str::to_string),
                                after: a.map(str::to_string),
                            },
                        )
                    })
                })
                .collect();
            (!changes.is_empty()).then(|| ModifiedElement {
                xpath: old.xpath.clone(),
                changes,
            })
        })
        .collect();

    let result = DiffResult {
        moved,
        removed: dedup_in_order(before)
            .filter(|e| removed.contains(e.xpath.as_str()))
            .map(|e| e.xpath.clone())
            .collect(),
        added: dedup_in_order(after)
            .filter(|e| added.contains(e.xpath.as_str()))
            .map(|e| e.xpath.clone())
            .collect(),
        modified,
    };

    debug!(summary = %result.summary(), "snapshot diff computed");
    result
}

/// Each xpath once, at its first position.
fn dedup_in_order(snapshot: &[ElementRecord]) -> impl Iterator<Item = &ElementRecord> {
    let mut seen = HashSet::new();
    snapshot.iter().filter(move |e| seen.insert(e.xpath.as_str()))
}
