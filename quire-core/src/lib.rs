// Core library for quire
// HTTP value types, the route table, the signature inspector and the request
// adapter that binds incoming requests to plain handler functions.

pub mod adapter;
pub mod api_error;
pub mod application;
pub mod arguments;
pub mod error;
pub mod form;
pub mod handler;
pub mod http;
pub mod logging;
pub mod reply;
pub mod route_registry;
pub mod routing;
pub mod signature;
pub mod status;
pub mod traits;

pub use adapter::CallContext;
pub use api_error::*;
pub use application::*;
pub use arguments::*;
pub use error::*;
pub use handler::*;
pub use http::*;
pub use reply::*;
pub use route_registry::RouteDeclaration;
pub use routing::*;
pub use signature::*;
pub use status::*;
pub use traits::*;

// Used by code generated from `#[get]` / `#[post]`
pub use inventory;
pub use serde_json;
