// Application: route table + renderer behind a hyper HTTP/1 server

use crate::{Error, HttpRequest, HttpResponse, HttpStatus, RouteTable, TemplateRenderer};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// The running site
#[derive(Clone)]
pub struct Application {
    routes: Arc<RouteTable>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
}

impl Application {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
            renderer: None,
        }
    }

    /// Renderer used for `Reply::Template`
    pub fn with_renderer<R: TemplateRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatch one request and render the outcome.
    ///
    /// Never fails: every error becomes a JSON error response.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let method = request.method.clone();
        let path = request.path.clone();

        let rendered = match self.routes.dispatch(request).await {
            Ok(reply) => reply.into_response(self.renderer.as_deref()),
            Err(err) => Err(err),
        };

        match rendered {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "request handled");
                response
            }
            Err(err) => {
                if err.is_server_error() {
                    error!(%method, %path, error = %err, "request failed");
                } else {
                    info!(%method, %path, status = err.status_code(), reason = %err.reason(), "request rejected");
                }
                error_response(&err)
            }
        }
    }

    /// Bind `addr` and serve until the process exits.
    pub async fn listen(self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, std::future::pending()).await
    }

    /// Accept connections on `listener` until `shutdown` completes.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        info!("server listening on http://{}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("server shutting down");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let app = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let app = app.clone();
                    async move { app.handle_hyper(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = %err, "error serving connection");
                }
            });
        }
    }

    async fn handle_hyper(
        &self,
        req: Request<IncomingBody>,
    ) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
        let target = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
        let mut request = HttpRequest::new(req.method().as_str(), target);

        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                request.headers.insert(name.to_string(), value.to_string());
            }
        }

        request.body = req.collect().await?.to_bytes().to_vec();

        Ok(into_hyper(self.handle(request).await))
    }
}

/// JSON body for a request that did not produce a reply
pub fn error_response(err: &Error) -> HttpResponse {
    let status = err.status_code();
    let body = serde_json::json!({
        "error": HttpStatus::reason_for(status),
        "message": err.reason(),
        "status": status,
    });
    HttpResponse::new(status)
        .with_json(&body)
        .unwrap_or_else(|_| HttpResponse::new(status))
}

fn into_hyper(response: HttpResponse) -> Response<Full<bytes::Bytes>> {
    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(bytes::Bytes::from(response.body)))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Full::new(bytes::Bytes::from_static(
                b"Internal Server Error",
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
