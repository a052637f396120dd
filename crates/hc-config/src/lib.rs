//! hc-config
//!
//! Layered YAML configuration for the calendar, forecast policy and daemon.
//!
//! Documents are merged in order (later layers override earlier ones), then
//! serialized to canonical JSON and hashed with SHA-256 so the calendar in
//! effect for any computed schedule can be fingerprinted.

mod consumption;
mod settings;

pub use consumption::{report_unused_keys, ConfigConsumer, UnusedKeyPolicy, UnusedKeyReport};
pub use settings::{AppConfig, CalendarSettings, WindowSettings, DEFAULT_TIMEZONE};

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Env var holding comma-separated config paths in merge order.
pub const ENV_CONFIG_PATHS: &str = "HC_CONFIG";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty document parses to null; treat it as an empty layer.
        if !v_json.is_null() {
            merged = deep_merge(merged, v_json);
        }
    }

    // serde_json::Map is BTreeMap-backed here, so key order is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Split an `HC_CONFIG`-style list into paths.
pub fn split_path_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (k, v) in overlay_map {
                let prev = base_map.remove(&k).unwrap_or(Value::Null);
                base_map.insert(k, deep_merge(prev, v));
            }
            Value::Object(base_map)
        }
        // Scalars and arrays replace wholesale (a holiday list in a later
        // layer replaces, never appends).
        (_, other) => other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
