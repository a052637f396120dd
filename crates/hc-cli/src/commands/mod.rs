//! Command handler modules for hc-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod forecast;
pub mod schedule;

use anyhow::{Context, Result};
use hc_config::{report_unused_keys, AppConfig, ConfigConsumer, UnusedKeyPolicy};
use std::fs;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Resolve config layers: explicit `--config` paths win, then `HC_CONFIG`,
/// then built-in defaults.
pub fn load_config(config_paths: &[String]) -> Result<AppConfig> {
    let paths: Vec<String> = if !config_paths.is_empty() {
        config_paths.to_vec()
    } else {
        match std::env::var(hc_config::ENV_CONFIG_PATHS) {
            Ok(raw) => hc_config::split_path_list(&raw),
            Err(_) => Vec::new(),
        }
    };

    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let cfg = AppConfig::load(&path_refs)?;

    let report = report_unused_keys(
        ConfigConsumer::Cli,
        &cfg.loaded.config_json,
        UnusedKeyPolicy::Warn,
    )?;
    if !report.is_clean() {
        warn!(unused = ?report.unused_leaf_pointers, "config has keys the CLI ignores");
    }
    debug!(config_hash = %cfg.config_hash(), layers = paths.len(), "config loaded");
    Ok(cfg)
}

/// Read a JSON document, tolerating a UTF-8 BOM.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    serde_json::from_slice(bytes).with_context(|| format!("{path} must contain valid JSON"))
}

/// Values from either an inline comma list or a JSON array file.
pub fn load_values(values: Option<String>, values_file: Option<String>) -> Result<Vec<f64>> {
    if let Some(p) = values_file {
        return read_json_file::<Vec<f64>>(&p);
    }

    let raw = values.context("must provide --values or --values-file")?;
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("--values: '{s}' is not a number"))
        })
        .collect()
}
