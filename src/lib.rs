// quire: a small blog site on decorator-style request handlers
//
// Handlers are plain async functions tagged with `#[get]` / `#[post]`; the
// route table inspects their parameters and the request adapter binds path,
// query, form, multipart and JSON values to them.

pub use quire_core::*;
pub use quire_macro::{get, post};

pub mod blog;
pub mod settings;

/// Module path scanned for the site's route declarations.
pub const HANDLER_MODULE: &str = "quire::blog::handlers";

/// Route table holding every handler declared under [`HANDLER_MODULE`].
pub fn site_routes() -> Result<RouteTable, RouteError> {
    let mut routes = RouteTable::new();
    let count = routes.add_routes(HANDLER_MODULE)?;
    tracing::debug!(count, module = HANDLER_MODULE, "site routes registered");

    for declaration in route_registry::all_declarations() {
        if !declaration.is_within(HANDLER_MODULE) {
            tracing::debug!(
                module = declaration.module,
                handler = declaration.name,
                "route declaration outside the site module not registered"
            );
        }
    }
    Ok(routes)
}
