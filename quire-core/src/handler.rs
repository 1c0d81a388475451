// Type-erased handler values
//
// A `Handler` couples an async callable with its declared parameter list and,
// once tagged, the method and path it is served under. Registration reads the
// tag and the parameters; the adapter only calls `call`.

use crate::{
    Arguments, Error, HandlerSignature, HttpMethod, IntoReply, Param, Reply, SignatureError,
};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a handler call
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send>>;

/// Type alias for the erased handler callable
pub type HandlerFn = Arc<dyn Fn(Arguments) -> HandlerFuture + Send + Sync>;

/// Route tag attached by `#[get]`/`#[post]` or the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: HttpMethod,
    pub path: String,
}

/// A callable endpoint plus its declared signature.
///
/// ```ignore
/// let handler = Handler::new("get_blog", |mut args: Arguments| async move {
///     let id: String = args.required("id")?;
///     Ok::<_, Error>(Reply::Text(id))
/// })
/// .params([Param::positional("id")])
/// .get("/blog/{id}");
/// ```
#[derive(Clone)]
pub struct Handler {
    name: String,
    params: Vec<Param>,
    route: Option<RouteMeta>,
    func: HandlerFn,
}

impl Handler {
    pub fn new<F, Fut, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoReply + 'static,
    {
        let func: HandlerFn = Arc::new(move |args| {
            let fut = f(args);
            Box::pin(async move { fut.await.into_reply() })
        });

        Self {
            name: name.into(),
            params: Vec::new(),
            route: None,
            func,
        }
    }

    /// Declare the parameter list, in declaration order.
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn route(mut self, method: HttpMethod, path: impl Into<String>) -> Self {
        self.route = Some(RouteMeta {
            method,
            path: path.into(),
        });
        self
    }

    pub fn get(self, path: impl Into<String>) -> Self {
        self.route(HttpMethod::GET, path)
    }

    pub fn post(self, path: impl Into<String>) -> Self {
        self.route(HttpMethod::POST, path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_params(&self) -> &[Param] {
        &self.params
    }

    pub fn route_meta(&self) -> Option<&RouteMeta> {
        self.route.as_ref()
    }

    /// Classify the declared parameters.
    pub fn signature(&self) -> Result<HandlerSignature, SignatureError> {
        HandlerSignature::inspect(&self.name, &self.params)
    }

    #[inline]
    pub fn call(&self, args: Arguments) -> HandlerFuture {
        (self.func)(args)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("route", &self.route)
            .finish()
    }
}
