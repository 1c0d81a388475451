// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::env;

/// Separator between nesting levels in variable names: `SERVER__PORT`.
pub const NESTING_SEPARATOR: &str = "__";

/// Collects prefixed environment variables.
///
/// With prefix `QUIRE`, `QUIRE_SERVER__PORT=9000` is reported as
/// `SERVER__PORT`; variables without the prefix are ignored.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.map(|p| p.trim_end_matches('_').to_ascii_uppercase()),
        }
    }

    /// Variables from the process environment, prefix stripped.
    pub fn load(&self) -> BTreeMap<String, String> {
        self.collect(env::vars())
    }

    /// Same as [`EnvLoader::load`] over an explicit set of variables.
    pub fn collect<I>(&self, vars: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| self.strip(&key).map(|key| (key.to_string(), value)))
            .collect()
    }

    fn strip<'k>(&self, key: &'k str) -> Option<&'k str> {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty()),
            None => Some(key),
        }
    }

    /// Read one variable, prefix applied.
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_ascii_uppercase()),
            None => key.to_ascii_uppercase(),
        };

        env::var(&full_key).map_err(ConfigError::Env)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// `SERVER__PORT` -> `["server", "port"]`
pub fn key_path(key: &str) -> Vec<String> {
    key.split(NESTING_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Typed view of a raw variable: JSON literals keep their type, anything else is a string.
pub fn env_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) if !value.is_string() => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Store `value` under a nested `path`, creating intermediate tables and
/// replacing scalars that stand in the way.
pub fn insert_path(root: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut table = root;
    for part in parents {
        let slot = table
            .entry(part.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        table = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
    table.insert(last.clone(), value);
}
