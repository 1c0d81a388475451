// Layered configuration for quire
//
// Sources are applied in the order they are loaded, later ones deep-merged
// over earlier ones: built-in defaults, files, `.env`, environment.

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Deep merge of `overrides` onto `defaults`.
///
/// Tables merge key by key; any other override value replaces the default
/// outright, and keys present only in `overrides` are added.
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    let mut merged = defaults.clone();
    merge_into(&mut merged, overrides);
    merged
}

fn merge_into(target: &mut Value, overrides: &Value) {
    match (target, overrides) {
        (Value::Object(base), Value::Object(over)) => {
            for (key, value) in over {
                match base.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, overrides) => *target = overrides.clone(),
    }
}

/// Main configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Value,
    env_prefix: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Value::Object(Map::new()),
            env_prefix: None,
        }
    }

    /// Only variables named `<prefix>_...` are picked up by [`ConfigManager::load_env`].
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Merge a table of settings over the current ones.
    pub fn load_value(&mut self, source: &str, value: Value) -> Result<()> {
        if !value.is_object() {
            return Err(ConfigError::NotATable(source.to_string()));
        }
        merge_into(&mut self.config, &value);
        debug!(source, "configuration source applied");
        Ok(())
    }

    /// Serialize `defaults` and merge them in.
    pub fn load_defaults<T: Serialize>(&mut self, defaults: &T) -> Result<()> {
        let value = serde_json::to_value(defaults).map_err(|e| ConfigError::Convert {
            key: "<defaults>".to_string(),
            reason: e.to_string(),
        })?;
        self.load_value("defaults", value)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        let value = ConfigLoader::new(format).load_file(path)?;
        self.load_value(&path.display().to_string(), value)
    }

    /// Load `path` if it exists; returns whether it was applied.
    pub fn load_optional_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!(path = %path.display(), "optional configuration file not present");
            return Ok(false);
        }
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        self.load_value(&path.display().to_string(), value)?;
        Ok(true)
    }

    /// Populate the process environment from a `.env` file, then load it.
    ///
    /// Without a path, a missing `.env` in the working directory is ignored.
    pub fn load_dotenv(&mut self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::Load {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Merge prefixed environment variables; `QUIRE_SERVER__PORT=9000` sets `server.port`.
    pub fn load_env(&mut self) -> Result<()> {
        let vars = EnvLoader::new(self.env_prefix.clone()).load();
        self.load_vars(vars)
    }

    /// Merge already prefix-stripped variables.
    pub fn load_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Map::new();
        for (key, raw) in vars {
            env::insert_path(&mut table, &env::key_path(&key), env::env_value(&raw));
        }
        self.load_value("environment", Value::Object(table))
    }

    /// Set a value under a dotted key.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::Convert {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        if let Value::Object(root) = &mut self.config {
            env::insert_path(root, &path, value);
        }
        Ok(())
    }

    /// Value under a dotted key such as `server.port`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.config, |node, part| node.as_object()?.get(part))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .value(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        T::deserialize(value).map_err(|e| ConfigError::Convert {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Top-level keys
    pub fn keys(&self) -> Vec<String> {
        self.config
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &Value {
        &self.config
    }

    /// Deserialize the whole configuration.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.config).map_err(|e| ConfigError::Convert {
            key: "<root>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Deserialize the whole configuration and run its checks.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let settings: T = self.extract()?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
