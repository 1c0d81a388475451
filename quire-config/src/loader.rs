// Configuration file loaders

use crate::env::{env_value, insert_path, key_path};
use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    /// `KEY=value` lines, keys mapped the same way as environment variables
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path`; a bare `.env` file counts as [`FileFormat::Env`].
    pub fn detect(path: &Path) -> Option<Self> {
        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Some(FileFormat::Env);
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Toml => "TOML",
            FileFormat::Env => "env",
        }
    }
}

/// Reads one configuration source into a JSON object.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the loader from the file name.
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        FileFormat::detect(path)
            .map(Self::new)
            .ok_or_else(|| ConfigError::Load {
                path: path.display().to_string(),
                reason: "unrecognised file format".to_string(),
            })
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.parse(&content)
    }

    /// Parse `content`; the top level must be a table.
    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => self.parse_json(content)?,
            FileFormat::Toml => self.parse_toml(content)?,
            FileFormat::Env => self.parse_env(content)?,
        };

        if value.is_object() {
            Ok(value)
        } else {
            Err(ConfigError::NotATable(format!("{} document", self.format.name())))
        }
    }

    fn parse_error(&self, reason: impl ToString) -> ConfigError {
        ConfigError::Parse {
            format: self.format.name(),
            reason: reason.to_string(),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(|e| self.parse_error(e))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let table: toml::Table = toml::from_str(content).map_err(|e| self.parse_error(e))?;
        serde_json::to_value(table).map_err(|e| self.parse_error(e))
    }

    fn parse_env(&self, content: &str) -> Result<Value> {
        let mut root = Map::new();

        for item in dotenvy::from_read_iter(content.as_bytes()) {
            let (key, raw) = item.map_err(|e| self.parse_error(e))?;
            insert_path(&mut root, &key_path(&key), env_value(&raw));
        }

        Ok(Value::Object(root))
    }
}
