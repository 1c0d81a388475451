// Error types for quire

use crate::{ApiError, HttpMethod, HttpStatus, SignatureError};
use thiserror::Error;

/// Request-time errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Raised on purpose by handler logic; rendered as a payload, never a fault.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BadRequest(_) | Error::Deserialization(_) => HttpStatus::BadRequest.code(),
            Error::NotFound(_) => HttpStatus::NotFound.code(),
            Error::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed.code(),
            Error::Api(_) => HttpStatus::Ok.code(),
            _ => HttpStatus::InternalServerError.code(),
        }
    }

    pub fn http_status(&self) -> HttpStatus {
        HttpStatus::from_code(self.status_code()).unwrap_or(HttpStatus::InternalServerError)
    }

    /// Message without the category prefix, as sent to clients
    pub fn reason(&self) -> String {
        match self {
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::MethodNotAllowed(msg)
            | Error::Template(msg)
            | Error::Internal(msg)
            | Error::Serialization(msg)
            | Error::Deserialization(msg) => msg.clone(),
            Error::Api(err) => err.message.clone(),
            Error::Io(err) => err.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Startup-time route configuration faults
#[derive(Error, Debug)]
pub enum RouteError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Duplicate route: {method} {path} is already registered")]
    DuplicateRoute { method: HttpMethod, path: String },

    #[error("@get or @post not defined in {handler}")]
    MissingRouteMetadata { handler: String },

    #[error("Route {method} {path} conflicts with an existing route: {reason}")]
    RouteConflict {
        method: HttpMethod,
        path: String,
        reason: String,
    },

    #[error("Invalid route path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::BadRequest("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
        assert_eq!(
            Error::Api(ApiError::permission_denied("no")).status_code(),
            200
        );
    }

    #[test]
    fn test_reason_strips_prefix() {
        let err = Error::BadRequest("Missing argument: name".into());
        assert_eq!(err.to_string(), "Bad Request: Missing argument: name");
        assert_eq!(err.reason(), "Missing argument: name");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_route_error_messages() {
        let err = RouteError::DuplicateRoute {
            method: HttpMethod::GET,
            path: "/".into(),
        };
        assert_eq!(err.to_string(), "Duplicate route: GET / is already registered");

        let err = RouteError::MissingRouteMetadata {
            handler: "index".into(),
        };
        assert!(err.to_string().contains("index"));
    }
}
