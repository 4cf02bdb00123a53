use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::extractor::{DEFAULT_EXTRACTOR_SCRIPT, SnapshotSource};
use crate::diff::differ::DiffOptions;
use crate::scoring::config::ScoringConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "dom-heal",
    version,
    about = "Self-healing selectors for UI test suites"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: dom-heal.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Heal a selector mapping against the current page
    #[command(group(ArgGroup::new("source").required(true).args(["url", "snapshot"])))]
    Heal {
        /// Selector mapping JSON (object or [{nome, selector}] list)
        #[arg(long)]
        json: PathBuf,

        /// Page to extract the current DOM from
        #[arg(long)]
        url: Option<String>,

        /// Saved snapshot to heal against instead of a live page
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Healing report path (default: ElementosAlterados.json next to the mapping)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Append a JSONL decision trace to this file
        #[arg(long)]
        trace: Option<PathBuf>,
    },

    /// Structural diff between two snapshot files
    Diff {
        #[arg(long)]
        before: PathBuf,

        #[arg(long)]
        after: PathBuf,

        /// Write the diff report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum fingerprint similarity for a fuzzy move
        #[arg(long)]
        threshold: Option<f64>,

        /// Attributes to compare, comma separated
        #[arg(long, value_delimiter = ',')]
        attributes: Option<Vec<String>>,
    },

    /// Capture a screen, compare it with its baseline and commit it
    #[command(group(ArgGroup::new("source").required(true).args(["url", "snapshot"])))]
    Capture {
        /// Screen name the baseline is stored under
        #[arg(long)]
        screen: String,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Selector mapping to rewrite from the detected diff
        #[arg(long)]
        elements: Option<PathBuf>,

        /// Baseline store directory
        #[arg(long, default_value = ".dom-heal")]
        store: PathBuf,
    },
}

/// Exactly one of `--url` / `--snapshot`, as enforced by the arg group.
pub fn snapshot_source(url: Option<String>, snapshot: Option<PathBuf>) -> Option<SnapshotSource> {
    match (snapshot, url) {
        (Some(path), _) => Some(SnapshotSource::File(path)),
        (None, Some(url)) => Some(SnapshotSource::Url(url)),
        (None, None) => None,
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `dom-heal.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub diff: DiffOptions,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_script")]
    pub script: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL decision trace, off unless set
    pub path: Option<PathBuf>,
}

fn default_script() -> String { DEFAULT_EXTRACTOR_SCRIPT.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("dom-heal.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Merge `diff` subcommand flags over the config file values.
pub fn resolve_diff_options(
    config: &DiffOptions,
    threshold: Option<f64>,
    attributes: Option<Vec<String>>,
) -> DiffOptions {
    DiffOptions {
        attributes: attributes.or_else(|| config.attributes.clone()),
        threshold: threshold.unwrap_or(config.threshold),
    }
}
