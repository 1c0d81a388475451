// Argument mapping handed to a handler call

use crate::{Error, HttpRequest};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Reserved argument name under which the raw request is injected.
pub const REQUEST_ARG: &str = "request";

/// Final argument set for one handler invocation.
///
/// Values are consumed as the handler binds them, so whatever is left when
/// [`Arguments::rest`] is called belongs to the catch-all parameter.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Map<String, Value>,
    request: Option<HttpRequest>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values,
            request: None,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name) || (name == REQUEST_ARG && self.request.is_some())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn set_request(&mut self, request: HttpRequest) {
        self.request = Some(request);
    }

    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref()
    }

    /// Move the raw request out for a `Request` parameter.
    pub fn take_request(&mut self) -> Result<HttpRequest, Error> {
        self.request
            .take()
            .ok_or_else(|| Error::Internal("request object was not injected".to_string()))
    }

    /// Bind a value the handler cannot run without.
    ///
    /// A missing value is a call fault, not a client error: required named
    /// arguments are validated before the handler is reached, so only an
    /// unmatched positional parameter ends up here.
    pub fn required<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, Error> {
        match self.values.remove(name) {
            Some(value) => bind(name, value),
            None => Err(Error::Internal(format!(
                "missing value for parameter '{}'",
                name
            ))),
        }
    }

    /// Bind a value that may be absent. `null` counts as absent.
    pub fn optional<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>, Error> {
        match self.values.remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => bind(name, value).map(Some),
        }
    }

    /// Drain every value not bound so far.
    pub fn rest(&mut self) -> Map<String, Value> {
        std::mem::take(&mut self.values)
    }

    /// Drain the leftovers into a catch-all parameter of type `T`.
    pub fn rest_as<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, Error> {
        let rest = Value::Object(self.rest());
        T::deserialize(&rest).map_err(|_| Error::BadRequest(format!("Invalid argument: {}", name)))
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}

/// Deserialize `value` into `T`, accepting textual forms of non-string types.
fn bind<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, Error> {
    if let Ok(bound) = T::deserialize(&value) {
        return Ok(bound);
    }
    match &value {
        Value::String(text) => serde_json::from_str(text).ok(),
        _ => None,
    }
    .ok_or_else(|| Error::BadRequest(format!("Invalid argument: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => Arguments::from_map(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_required_binds_and_consumes() {
        let mut a = args(json!({"name": "Test", "page": 2}));
        let name: String = a.required("name").unwrap();
        assert_eq!(name, "Test");
        assert!(!a.contains("name"));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_string_coerces_to_number_and_bool() {
        let mut a = args(json!({"id": "42", "draft": "true"}));
        let id: u32 = a.required("id").unwrap();
        let draft: bool = a.required("draft").unwrap();
        assert_eq!(id, 42);
        assert!(draft);
    }

    #[test]
    fn test_unbindable_value_is_bad_request() {
        let mut a = args(json!({"id": "abc"}));
        let err = a.required::<u32>("id").unwrap_err();
        assert!(matches!(err, Error::BadRequest(ref m) if m == "Invalid argument: id"));
    }

    #[test]
    fn test_missing_required_is_internal() {
        let mut a = Arguments::new();
        assert!(matches!(a.required::<String>("id"), Err(Error::Internal(_))));
    }

    #[test]
    fn test_optional_treats_null_as_absent() {
        let mut a = args(json!({"image": null, "page": "3"}));
        assert_eq!(a.optional::<String>("image").unwrap(), None);
        assert_eq!(a.optional::<String>("missing").unwrap(), None);
        assert_eq!(a.optional::<u32>("page").unwrap(), Some(3));
    }

    #[test]
    fn test_rest_drains_leftovers() {
        let mut a = args(json!({"id": "1", "x": 1, "y": "two"}));
        let _: String = a.required("id").unwrap();
        let rest = a.rest();
        assert_eq!(Value::Object(rest), json!({"x": 1, "y": "two"}));
        assert!(a.is_empty());
    }

    #[test]
    fn test_rest_as_typed_map() {
        use std::collections::HashMap;

        let mut a = args(json!({"tag": "rust", "lang": "en"}));
        let rest: HashMap<String, String> = a.rest_as("kw").unwrap();
        assert_eq!(rest.get("tag").map(String::as_str), Some("rust"));

        let mut a = args(json!({"n": 1}));
        assert!(a.rest_as::<HashMap<String, String>>("kw").is_err());
    }

    #[test]
    fn test_request_slot() {
        let mut a = Arguments::new();
        assert!(a.take_request().is_err());
        a.set_request(HttpRequest::new("GET", "/"));
        assert!(a.contains(REQUEST_ARG));
        assert_eq!(a.take_request().unwrap().path, "/");
        assert!(a.request().is_none());
    }
}
