// Route declaration macros for quire
//
// `#[get("/path")]` and `#[post("/path")]` keep the annotated function as is,
// generate `<name>_route() -> quire_core::Handler` carrying the parameter
// descriptors and the route tag, and register it for module auto-scan.

use proc_macro::TokenStream;

mod route_validation;
mod routes;

/// HTTP GET route declaration
///
/// ```ignore
/// #[get("/blog/{id}")]
/// async fn get_blog(id: String, #[named] page: Option<u32>, request: HttpRequest) -> Reply {
///     // ...
/// }
/// ```
///
/// Parameters are classified as follows:
/// - a parameter of type `HttpRequest` receives the raw request and must be last;
/// - `#[named]` parameters come from the query string or body, required
///   unless their type is `Option<_>`;
/// - one `#[rest]` parameter may collect every argument not bound elsewhere;
/// - any other parameter is bound from the matched path.
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    routes::route_impl(attr, item, "GET")
}

/// HTTP POST route declaration. See [`macro@get`] for parameter rules.
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    routes::route_impl(attr, item, "POST")
}
