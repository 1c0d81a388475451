// Site settings: built-in defaults, optional override file, QUIRE_* environment

use quire_config::{ConfigError, ConfigManager, ConfigValidator, Validate};
use quire_core::logging::{LogConfig, LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Prefix of the environment variables read at startup
pub const ENV_PREFIX: &str = "QUIRE";

/// Override file merged over the defaults when present
pub const OVERRIDE_FILE: &str = "config/override.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub debug: bool,
    pub server: ServerConfig,
    pub log: LogSettings,
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: true,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 9000,
            },
            log: LogSettings {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            templates: TemplateConfig {
                dir: "site/templates".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `override_file` if it exists, then the environment.
    pub fn load(override_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager.load_defaults(&AppConfig::default())?;
        manager.load_optional_file(override_file)?;
        manager.load_env()?;
        manager.load_validated()
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Convert {
                key: "server".to_string(),
                reason: e.to_string(),
            })
    }

    pub fn log_config(&self) -> LogConfig {
        let level = LogLevel::from_str(&self.log.level).unwrap_or(LogLevel::Info);
        let format = LogFormat::from_str(&self.log.format).unwrap_or(LogFormat::Pretty);
        // debug mode never logs less than debug
        let level = match (self.debug, level) {
            (true, LogLevel::Info | LogLevel::Warn | LogLevel::Error) => LogLevel::Debug,
            _ => level,
        };
        LogConfig::new().level(level).format(format)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> quire_config::Result<()> {
        ConfigValidator::not_empty(&self.server.host, "server.host")?;
        ConfigValidator::is_port(self.server.port, "server.port")?;
        ConfigValidator::one_of(
            &self.log.level,
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;
        ConfigValidator::one_of(
            &self.log.format,
            &["json", "plain", "pretty", "compact"],
            "log.format",
        )?;
        ConfigValidator::not_empty(&self.templates.dir, "templates.dir")
    }
}
