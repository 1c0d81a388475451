// Configuration validation

use crate::{ConfigError, Result};

/// Checks run on a settings struct after it is deserialized.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field-level checks shared by [`Validate`] implementations.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::validation(format!("{} cannot be empty", field)));
        }
        Ok(())
    }

    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::validation(format!(
                "{} must be a port between 1 and 65535",
                field
            )));
        }
        Ok(())
    }

    pub fn one_of(value: &str, allowed: &[&str], field: &str) -> Result<()> {
        if !allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
            return Err(ConfigError::validation(format!(
                "{} must be one of {}, got '{}'",
                field,
                allowed.join(", "),
                value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(ConfigValidator::not_empty("site/templates", "templates.dir").is_ok());
        assert!(ConfigValidator::not_empty("  ", "templates.dir").is_err());
    }

    #[test]
    fn test_port() {
        assert!(ConfigValidator::is_port(9000, "server.port").is_ok());
        let err = ConfigValidator::is_port(0, "server.port").unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_one_of() {
        let formats = ["json", "plain", "pretty", "compact"];
        assert!(ConfigValidator::one_of("JSON", &formats, "log.format").is_ok());
        let err = ConfigValidator::one_of("xml", &formats, "log.format").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid setting: log.format must be one of json, plain, pretty, compact, got 'xml'"
        );
    }
}
