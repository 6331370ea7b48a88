//! Settings loading: compiled defaults, then the JSON file deep-merged on
//! top, then `SOLACE_*` environment overrides.
//!
//! Merge rules: objects merge per key, arrays and primitives are replaced,
//! nulls in the file are skipped.

use std::path::{Path, PathBuf};

use serde_json::Value;
use solace_logging::LogFormat;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::SolaceSettings;

/// Default settings file location (`~/.solace/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".solace").join("settings.json")
}

/// Load from [`settings_path`] with env overrides.
pub fn load_settings() -> Result<SolaceSettings> {
    load_settings_from_path(&settings_path())
}

/// Load from `path` with env overrides. A missing file yields defaults; an
/// unreadable or malformed one is an error.
pub fn load_settings_from_path(path: &Path) -> Result<SolaceSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SolaceSettings> {
    let defaults = serde_json::to_value(SolaceSettings::default())?;
    let merged = if path.exists() {
        debug!(?path, "loading settings file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "no settings file, using defaults");
        defaults
    };
    Ok(serde_json::from_value(merged)?)
}

/// Recursively merge `source` over `target`.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `SOLACE_*` variables from the process environment.
pub fn apply_env_overrides(settings: &mut SolaceSettings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Invalid values are logged and
/// ignored, leaving the file or default value in place.
pub fn apply_overrides(settings: &mut SolaceSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    if let Some(v) = env.string("SOLACE_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.parsed("SOLACE_PORT", |s| parse_range(s, 0_u16, u16::MAX)) {
        settings.server.port = v;
    }
    if let Some(v) = env.parsed("SOLACE_MAX_CONNECTIONS", |s| parse_range(s, 1_usize, 1_000_000)) {
        settings.server.max_connections = v;
    }
    if let Some(v) = env.parsed("SOLACE_HEARTBEAT_INTERVAL_SECS", |s| parse_range(s, 1_u64, 3600)) {
        settings.server.heartbeat_interval_secs = v;
    }
    if let Some(v) = env.parsed("SOLACE_HISTORY_LIMIT", |s| parse_range(s, 0_usize, 1000)) {
        settings.chat.history_limit = v;
    }
    if let Some(v) = env.parsed("SOLACE_MAX_CONTENT_LENGTH", |s| parse_range(s, 1_usize, 1_048_576)) {
        settings.chat.max_content_length = v;
    }
    if let Some(v) = env.string("SOLACE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.parsed("SOLACE_LOG_FORMAT", LogFormat::parse) {
        settings.logging.format = v;
    }
}

/// Parse an integer and check it against an inclusive range.
pub fn parse_range<T>(val: &str, min: T, max: T) -> Option<T>
where
    T: std::str::FromStr + PartialOrd,
{
    let n: T = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let val = self.string(key)?;
        let result = parse(&val);
        if result.is_none() {
            warn!(key, value = %val, "invalid env var, ignoring");
        }
        result
    }
}
