// Route table: (method, path pattern) -> handler entry

use crate::{
    Error, Handler, HandlerSignature, HttpMethod, HttpRequest, Reply, RouteError, SignatureError,
    adapter, route_registry,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A registered handler with its cached signature.
///
/// Created once at startup and never mutated afterwards.
#[derive(Debug)]
pub struct RouteEntry {
    pub method: HttpMethod,
    pub path: String,
    pub handler: Handler,
    pub signature: HandlerSignature,
}

impl RouteEntry {
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<Self, SignatureError> {
        let signature = handler.signature()?;
        Ok(Self {
            method,
            path: path.into(),
            handler,
            signature,
        })
    }
}

/// Result of a successful lookup
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    pub params: HashMap<String, String>,
}

/// Routes registered at startup, shared read-only afterwards
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    index: HashMap<(HttpMethod, String), usize>,
    matchers: HashMap<HttpMethod, matchit::Router<usize>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `method` and `path`.
    ///
    /// The handler must carry a route tag even though the tag's own method
    /// and path are not used here; this lets one handler be served under
    /// several paths.
    pub fn register(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: Handler,
    ) -> Result<Arc<RouteEntry>, RouteError> {
        if handler.route_meta().is_none() {
            return Err(RouteError::MissingRouteMetadata {
                handler: handler.name().to_string(),
            });
        }

        let key = (method, path.to_string());
        if self.index.contains_key(&key) {
            return Err(RouteError::DuplicateRoute {
                method,
                path: path.to_string(),
            });
        }

        let entry = Arc::new(RouteEntry::new(method, path, handler)?);
        let position = self.entries.len();

        self.matchers
            .entry(method)
            .or_insert_with(matchit::Router::new)
            .insert(path, position)
            .map_err(|e| match e {
                matchit::InsertError::Conflict { .. } => RouteError::RouteConflict {
                    method,
                    path: path.to_string(),
                    reason: e.to_string(),
                },
                _ => RouteError::InvalidPath {
                    path: path.to_string(),
                    reason: e.to_string(),
                },
            })?;

        info!(
            "add route {} {} => {}({})",
            method,
            path,
            entry.handler.name(),
            entry.signature
        );

        self.index.insert(key, position);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Register `handler` under its own route tag.
    pub fn add_route(&mut self, handler: Handler) -> Result<Arc<RouteEntry>, RouteError> {
        let Some(meta) = handler.route_meta().cloned() else {
            return Err(RouteError::MissingRouteMetadata {
                handler: handler.name().to_string(),
            });
        };
        self.register(meta.method, &meta.path, handler)
    }

    /// Register every `#[get]`/`#[post]` handler declared in `module` or
    /// one of its submodules. Returns how many were added.
    pub fn add_routes(&mut self, module: &str) -> Result<usize, RouteError> {
        let declarations = route_registry::declarations_in(module);
        debug!(module, found = declarations.len(), "scan routes");

        for declaration in &declarations {
            self.add_route((declaration.handler)())?;
        }
        Ok(declarations.len())
    }

    /// Find the entry for `method` and `path`.
    ///
    /// Reports `MethodNotAllowed` when the path is only served under other
    /// methods, `NotFound` otherwise.
    pub fn resolve(&self, method: &str, path: &str) -> Result<RouteMatch, Error> {
        let requested = HttpMethod::from_str(method);

        if let Some(matcher) = requested.and_then(|m| self.matchers.get(&m))
            && let Ok(found) = matcher.at(path)
        {
            let params = found
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            return Ok(RouteMatch {
                entry: self.entries[*found.value].clone(),
                params,
            });
        }

        let served_elsewhere = self
            .matchers
            .iter()
            .filter(|(m, _)| Some(**m) != requested)
            .any(|(_, matcher)| matcher.at(path).is_ok());

        if served_elsewhere {
            Err(Error::MethodNotAllowed(format!("{} {}", method, path)))
        } else {
            Err(Error::NotFound(format!("{} {}", method, path)))
        }
    }

    /// Resolve and run `request` through the adapter.
    pub async fn dispatch(&self, mut request: HttpRequest) -> Result<Reply, Error> {
        let found = self.resolve(&request.method, &request.path)?;
        request.path_params = found.params;
        adapter::handle(&found.entry, request).await
    }

    pub fn entries(&self) -> impl Iterator<Item = &Arc<RouteEntry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arguments, Param};

    fn blog_handler(name: &str) -> Handler {
        Handler::new(name, |mut args: Arguments| async move {
            let id: String = args.required("id")?;
            Ok::<_, Error>(Reply::Text(id))
        })
        .params([Param::positional("id")])
    }

    #[test]
    fn test_untagged_handler_is_rejected() {
        let mut table = RouteTable::new();
        let err = table
            .register(HttpMethod::GET, "/blog/{id}", blog_handler("get_blog"))
            .unwrap_err();
        assert!(matches!(err, RouteError::MissingRouteMetadata { ref handler } if handler == "get_blog"));
        assert!(table.add_route(blog_handler("get_blog")).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut table = RouteTable::new();
        table
            .add_route(blog_handler("a").get("/blog/{id}"))
            .unwrap();
        let err = table
            .add_route(blog_handler("b").get("/blog/{id}"))
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { method: HttpMethod::GET, .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_handler_under_two_paths() {
        let mut table = RouteTable::new();
        let handler = blog_handler("get_blog").get("/blog/{id}");
        table
            .register(HttpMethod::GET, "/blog/{id}", handler.clone())
            .unwrap();
        table
            .register(HttpMethod::GET, "/manage/blogs/{id}", handler)
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_same_path_different_methods() {
        let mut table = RouteTable::new();
        table.add_route(blog_handler("a").get("/blog/{id}")).unwrap();
        table.add_route(blog_handler("b").post("/blog/{id}")).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_conflicting_pattern() {
        let mut table = RouteTable::new();
        table.add_route(blog_handler("a").get("/blog/{id}")).unwrap();
        let handler = Handler::new("b", |_args: Arguments| async { "b" })
            .params([Param::positional("slug")])
            .get("/blog/{slug}");
        let err = table.add_route(handler).unwrap_err();
        assert!(matches!(err, RouteError::RouteConflict { .. }));
    }

    #[test]
    fn test_signature_error_aborts_registration() {
        let mut table = RouteTable::new();
        let handler = blog_handler("bad")
            .params([Param::request("request"), Param::positional("id")])
            .get("/bad/{id}");
        let err = table.add_route(handler).unwrap_err();
        assert!(matches!(err, RouteError::Signature(_)));
        assert!(table.resolve("GET", "/bad/1").is_err());
    }

    #[test]
    fn test_resolve_not_found_and_not_allowed() {
        let mut table = RouteTable::new();
        table.add_route(blog_handler("a").get("/blog/{id}")).unwrap();

        let found = table.resolve("GET", "/blog/42").unwrap();
        assert_eq!(found.params.get("id"), Some(&"42".to_string()));
        assert_eq!(found.entry.handler.name(), "a");

        assert!(matches!(
            table.resolve("POST", "/blog/42"),
            Err(Error::MethodNotAllowed(_))
        ));
        assert!(matches!(
            table.resolve("DELETE", "/blog/42"),
            Err(Error::MethodNotAllowed(_))
        ));
        assert!(matches!(
            table.resolve("GET", "/nothing"),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_binds_path_params() {
        let mut table = RouteTable::new();
        table.add_route(blog_handler("a").get("/blog/{id}")).unwrap();

        let reply = table
            .dispatch(HttpRequest::new("GET", "/blog/abc?x=1"))
            .await
            .unwrap();
        assert!(matches!(reply, Reply::Text(ref s) if s == "abc"));
    }
}
