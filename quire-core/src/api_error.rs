// Domain-level API errors raised intentionally by handlers

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Structured failure a handler returns on purpose.
///
/// The adapter never lets this escape as a fault: it is rendered as the
/// payload `{"error": .., "data": .., "message": ..}`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{error}: {message}")]
pub struct ApiError {
    pub error: String,
    pub data: Value,
    pub message: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, data: Value, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            data,
            message: message.into(),
        }
    }

    /// Input value is invalid; `data` names the offending field.
    pub fn value_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new("value:invalid", Value::String(field.into()), message)
    }

    /// `data` names the missing resource.
    pub fn resource_not_found(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new("value:notfound", Value::String(field.into()), message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(
            "permission:forbidden",
            Value::String("permission".to_string()),
            message,
        )
    }

    /// The wire payload for this error
    pub fn to_payload(&self) -> Value {
        json!({
            "error": self.error,
            "data": self.data,
            "message": self.message,
        })
    }
}
