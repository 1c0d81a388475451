//! Testing utilities for quire.
//!
//! [`TestClient`] pushes requests through an [`Application`] without opening
//! a socket: route resolution, the request adapter, reply rendering and the
//! error boundary all run exactly as they do behind the server.
//!
//! ```no_run
//! use quire_core::{Arguments, Handler, RouteTable};
//! use quire_testing::*;
//!
//! # tokio_test::block_on(async {
//! let mut routes = RouteTable::new();
//! routes
//!     .add_route(Handler::new("hello", |_args: Arguments| async { "Hello!" }).get("/hello"))
//!     .unwrap();
//!
//! let client = TestClient::from_routes(routes);
//! let response = client.get("/hello").await;
//! assert_status(&response, 200);
//! assert_eq!(response.body_string(), "Hello!");
//! # });
//! ```

pub mod assertions;
pub mod test_client;

pub use assertions::*;
pub use test_client::{TestClient, TestRequestBuilder, TestResponse};

pub use quire_core::{Application, HttpRequest, HttpResponse};
