// HTTP request and response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP request as seen by the adapter
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query_string: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Build a request from a method and a request target (`/path?query`).
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query_string) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target, None),
        };

        Self {
            method: method.into().to_ascii_uppercase(),
            path,
            query_string,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw `Content-Type` header value, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Lower-cased media type without parameters (`application/json`)
    pub fn mime_type(&self) -> Option<String> {
        self.content_type().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Get a matched path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, crate::Error> {
        serde_json::from_slice(&self.body).map_err(|e| crate::Error::Deserialization(e.to_string()))
    }
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers.insert(
            "Content-Type".to_string(),
            "application/json;charset=utf-8".to_string(),
        );
        Ok(self)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html;charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/plain;charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    /// 302 redirect to `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).with_header("Location", location)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_query_string() {
        let req = HttpRequest::new("get", "/api/users?page=2&size=10");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/users");
        assert_eq!(req.query_string.as_deref(), Some("page=2&size=10"));

        let req = HttpRequest::new("POST", "/api/users");
        assert!(req.query_string.is_none());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = HttpRequest::new("POST", "/")
            .with_header("Content-Type", "Application/JSON; charset=utf-8");
        assert_eq!(
            req.header("content-type"),
            Some("Application/JSON; charset=utf-8")
        );
        assert_eq!(req.mime_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn test_blank_content_type_counts_as_missing() {
        let req = HttpRequest::new("POST", "/").with_header("Content-Type", "  ");
        assert!(req.content_type().is_none());
        assert!(req.mime_type().is_none());
    }

    #[test]
    fn test_response_helpers() {
        let res = HttpResponse::redirect("/signin");
        assert_eq!(res.status, 302);
        assert_eq!(res.header("location"), Some("/signin"));

        let res = HttpResponse::ok()
            .with_json(&serde_json::json!({"ok": true}))
            .unwrap();
        assert_eq!(res.body_string(), r#"{"ok":true}"#);
        assert!(res.header("content-type").unwrap().starts_with("application/json"));
    }
}
