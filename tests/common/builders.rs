#![allow(dead_code)]

use std::collections::HashSet;

use dom_heal::heal::mapping::LogicalMapping;
use dom_heal::matcher::matcher::{MatchCandidate, SelectorMatcher};
use dom_heal::scoring::config::ScoringConfig;
use dom_heal::snapshot::element::ElementRecord;

pub fn el(tag: &str, xpath: &str) -> ElementRecord {
    ElementRecord::new(tag, xpath)
}

pub fn mapping(pairs: &[(&str, &str)]) -> LogicalMapping {
    LogicalMapping::from_pairs(pairs)
}

/// One matcher call with nothing excluded and the default policy.
pub fn match_one(old_selector: &str, logical_name: &str, snapshot: &[ElementRecord]) -> Option<MatchCandidate> {
    let config = ScoringConfig::default();
    SelectorMatcher::new(&config).find_match(old_selector, snapshot, Some(logical_name), &HashSet::new())
}

/// Snapshot as the extractor would write it to disk.
pub fn snapshot_json(snapshot: &[ElementRecord]) -> String {
    serde_json::to_string_pretty(snapshot).unwrap()
}
