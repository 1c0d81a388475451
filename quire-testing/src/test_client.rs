// In-process test client

use quire_core::{Application, HttpMethod, HttpRequest, HttpResponse, RouteTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Drives an [`Application`] the way the server does, minus the socket.
#[derive(Clone)]
pub struct TestClient {
    app: Arc<Application>,
}

impl TestClient {
    pub fn new(app: Application) -> Self {
        Self { app: Arc::new(app) }
    }

    /// Client over a bare route table, without a template renderer.
    pub fn from_routes(routes: RouteTable) -> Self {
        Self::new(Application::new(routes))
    }

    pub async fn get(&self, target: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::GET, target).build())
            .await
    }

    /// POST `body` serialized as JSON.
    pub async fn post_json<T: Serialize>(&self, target: &str, body: &T) -> TestResponse {
        let request = TestRequestBuilder::new(HttpMethod::POST, target)
            .json(body)
            .build();
        self.send(request).await
    }

    /// POST `fields` url-encoded.
    pub async fn post_form<T: Serialize>(&self, target: &str, fields: &T) -> TestResponse {
        let request = TestRequestBuilder::new(HttpMethod::POST, target)
            .form(fields)
            .build();
        self.send(request).await
    }

    /// POST with an explicit content type; `None` sends no Content-Type header.
    pub async fn post_raw(
        &self,
        target: &str,
        content_type: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> TestResponse {
        let mut builder = TestRequestBuilder::new(HttpMethod::POST, target).body(body);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        self.send(builder.build()).await
    }

    pub async fn send(&self, request: HttpRequest) -> TestResponse {
        TestResponse(self.app.handle(request).await)
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    request: HttpRequest,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, target: &str) -> Self {
        Self {
            request: HttpRequest::new(method.as_str(), target),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_header(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request = self.request.with_body(body);
        self
    }

    /// JSON body plus `Content-Type: application/json`.
    ///
    /// # Panics
    ///
    /// If `data` cannot be serialized.
    pub fn json<T: Serialize>(self, data: &T) -> Self {
        let body = serde_json::to_vec(data).expect("test body must serialize to JSON");
        self.header("Content-Type", "application/json").body(body)
    }

    /// Url-encoded body plus the form content type.
    ///
    /// # Panics
    ///
    /// If `fields` is not a flat sequence of key/value pairs.
    pub fn form<T: Serialize>(self, fields: &T) -> Self {
        let body = serde_urlencoded::to_string(fields).expect("test form must url-encode");
        self.header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
    }

    pub fn build(self) -> HttpRequest {
        self.request
    }
}

/// Response from a test request
#[derive(Debug, Clone)]
pub struct TestResponse(pub HttpResponse);

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.0.status
    }

    pub fn body_string(&self) -> String {
        self.0.body_string()
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// If the body is not valid JSON for `T`.
    pub fn body_json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.0.body).unwrap_or_else(|e| {
            panic!(
                "response body is not the expected JSON ({}): {}",
                e,
                self.body_string()
            )
        })
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.0.header(name)
    }

    pub fn into_inner(self) -> HttpResponse {
        self.0
    }
}
