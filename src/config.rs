// src/config.rs
//
// Every crawl knob in one YAML file. All fields default so a partial file
// (or none) is usable.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::filter::FilterRule;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    pub base_url: String,
    /// List page path, e.g. `/players`, `/teams`, `/staffs`.
    pub list_path: String,
    /// Builtin schema name: players | staff | teams | tournaments.
    pub schema: String,
    /// Server-side sort key to request; `null` leaves the origin's default.
    pub sort: Option<String>,
    /// Dimension values iterated in an outer loop (e.g. positions/roles).
    /// Empty means a single unrestricted pass.
    pub dimensions: Vec<String>,
    pub dimension_param: String,
    pub start_param: String,
    /// Carried onto every page URL (e.g. a country filter).
    pub extra_params: BTreeMap<String, String>,
    /// Start offset for each dimension's cursor.
    pub start: u64,
    pub page_delay_ms: u64,
    pub dimension_delay_ms: u64,
    /// Pacing randomization: actual delay is base ± jitter.
    pub jitter_ms: u64,
    /// Hard per-dimension ceiling against a misbehaving end-of-data signal.
    pub max_pages: u32,
    /// Verbose per-row logging for the first page of each dimension.
    pub debug_rows: bool,
    pub filters: Vec<FilterRule>,
    pub entry: EntryConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://meneger.net".into(),
            list_path: "/players".into(),
            schema: "players".into(),
            sort: Some("mas".into()),
            dimensions: Vec::new(),
            dimension_param: "pos".into(),
            start_param: "start".into(),
            extra_params: BTreeMap::new(),
            start: 0,
            page_delay_ms: 300,
            dimension_delay_ms: 600,
            jitter_ms: 100,
            max_pages: 2000,
            debug_rows: false,
            filters: Vec::new(),
            entry: EntryConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// The entry-form poller (`apply_entries` binary).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntryConfig {
    /// Tournament page paths to poll, e.g. `/marbella-cup`.
    pub paths: Vec<String>,
    /// Case-insensitive rule for the submit control's text.
    pub button_pattern: String,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    /// Gap between successive paths within one sweep.
    pub gap_ms: u64,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            button_pattern: r"take\s*part".into(),
            min_interval_ms: 30_000,
            max_interval_ms: 45_000,
            gap_ms: 800,
        }
    }
}
