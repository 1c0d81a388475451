// Assertions over test responses

use crate::TestResponse;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {} with body: {}",
        expected,
        actual,
        response.body_string()
    );
}

/// Assert the body parses as `T` and equals `expected`.
pub fn assert_json<T>(response: &TestResponse, expected: &T)
where
    T: DeserializeOwned + PartialEq + Debug,
{
    let actual: T = response.body_json();
    assert_eq!(actual, *expected, "JSON bodies do not match");
}

pub fn assert_header(response: &TestResponse, name: &str, expected: &str) {
    let actual = response.header(name);
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        name,
        expected,
        actual
    );
}

pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}'. Body: {}",
        expected,
        body
    );
}

/// Assert a rejected request: `status` plus the `message` of the JSON error body.
pub fn assert_rejected(response: &TestResponse, status: u16, message: &str) {
    assert_status(response, status);
    let body: serde_json::Value = response.body_json();
    assert_eq!(
        body["message"].as_str(),
        Some(message),
        "Unexpected error body: {}",
        body
    );
}

pub fn assert_redirect(response: &TestResponse, location: &str) {
    assert_status(response, 302);
    assert_header(response, "Location", location);
}
