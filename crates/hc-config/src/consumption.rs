//! Unused-key guard.
//!
//! Each consumer registers the JSON-pointer prefixes it actually reads. Any
//! leaf of the merged config not under one of those prefixes is reported, so
//! a typo such as `calendar/holiday` (missing `s`) does not silently fall back
//! to defaults.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigConsumer {
    Cli,
    Daemon,
}

impl ConfigConsumer {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigConsumer::Cli => "CLI",
            ConfigConsumer::Daemon => "DAEMON",
        }
    }

    /// Prefixes this consumer reads or tolerates. Keep in sync with `settings.rs`.
    ///
    /// The CLI shares config layers with the daemon, so `/daemon/addr` is
    /// tolerated there rather than reported.
    pub fn consumed_prefixes(&self) -> &'static [&'static str] {
        match self {
            ConfigConsumer::Cli => &[
                "/calendar/holidays",
                "/calendar/ordinary",
                "/calendar/non_trading",
                "/calendar/max_search_days",
                "/calendar/timezone",
                "/forecast",
                "/daemon/addr",
            ],
            ConfigConsumer::Daemon => &[
                "/calendar/holidays",
                "/calendar/ordinary",
                "/calendar/non_trading",
                "/calendar/max_search_days",
                "/calendar/timezone",
                "/forecast",
                "/daemon/addr",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub consumer: String,
    /// Sorted leaf pointers no prefix covers.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report leaves of `config_json` that `consumer` never reads.
///
/// With [`UnusedKeyPolicy::Fail`] a non-clean report is an error.
pub fn report_unused_keys(
    consumer: ConfigConsumer,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let mut leaves = Vec::new();
    collect_leaves(config_json, String::new(), &mut leaves);

    let prefixes = consumer.consumed_prefixes();
    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| !prefixes.iter().any(|p| covers(p, leaf)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumer: consumer.as_str().to_string(),
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (consumer={}): {} unused key(s): {:?}",
            report.consumer,
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers
        );
    }
    Ok(report)
}

/// `/a/b` covers `/a/b` and `/a/b/c`, not `/a/bc`.
fn covers(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn collect_leaves(v: &Value, at: String, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, child) in map {
                let token = k.replace('~', "~0").replace('/', "~1");
                collect_leaves(child, format!("{at}/{token}"), out);
            }
        }
        // Arrays are values here (holiday lists), not subtrees.
        _ => {
            if !at.is_empty() {
                out.push(at);
            }
        }
    }
}
