//! Request adapter: turns an incoming request into a handler call.
//!
//! For every matched request the adapter
//!
//! 1. decides from the cached [`HandlerSignature`] whether the query string or
//!    body has to be read at all,
//! 2. extracts those parameters (JSON object, URL-encoded or multipart body for
//!    POST, query string for GET),
//! 3. narrows them to the declared named parameters unless the handler has a
//!    catch-all, then lays the path parameters over them,
//! 4. hands the raw request over when the handler asks for it,
//! 5. checks that every required named parameter is present,
//! 6. calls the handler and renders a domain [`ApiError`](crate::ApiError) as
//!    its `{error, data, message}` payload.
//!
//! No state survives a call; entries are shared read-only across requests.

use crate::{Arguments, Error, HttpMethod, HttpRequest, REQUEST_ARG, Reply, RouteEntry, form};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Per-request working set, discarded after the call
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CallContext {
    /// Parameters read from the body or query string; `None` when the
    /// handler declares no named parameters and nothing was read.
    pub body_parameters: Option<Map<String, Value>>,
    pub path_parameters: Map<String, Value>,
    pub merged_arguments: Map<String, Value>,
    /// Keys present in both the path and the body/query; the path value won.
    pub collisions: Vec<String>,
}

/// Read the query string (GET) or body (POST) into a flat mapping.
pub fn extract_parameters(
    method: HttpMethod,
    request: &HttpRequest,
) -> Result<Map<String, Value>, Error> {
    match method {
        HttpMethod::POST => {
            let content_type = request
                .content_type()
                .ok_or_else(|| Error::BadRequest("Missing Content-Type.".to_string()))?;
            let mime = request.mime_type().unwrap_or_default();

            match mime.as_str() {
                "application/json" => {
                    let body: Value = serde_json::from_slice(&request.body)
                        .map_err(|e| Error::BadRequest(format!("Invalid JSON body: {}", e)))?;
                    match body {
                        Value::Object(map) => Ok(map),
                        _ => Err(Error::BadRequest("JSON body must be object.".to_string())),
                    }
                }
                "application/x-www-form-urlencoded" => form::parse_form(&request.body),
                "multipart/form-data" => form::parse_multipart(content_type, &request.body),
                _ => Err(Error::BadRequest(format!(
                    "Unsupported Content-Type: {}",
                    mime
                ))),
            }
        }
        HttpMethod::GET => match request.query_string.as_deref() {
            Some(query) if !query.is_empty() => form::parse_query(query),
            _ => Ok(Map::new()),
        },
    }
}

/// Build the argument mapping for `entry` without calling it.
pub fn prepare(entry: &RouteEntry, request: &HttpRequest) -> Result<CallContext, Error> {
    let signature = &entry.signature;

    let path_parameters: Map<String, Value> = request
        .path_params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let body_parameters = if signature.needs_arguments() {
        Some(extract_parameters(entry.method, request)?)
    } else {
        None
    };

    let mut collisions = Vec::new();
    let mut merged_arguments = match body_parameters.as_ref().filter(|m| !m.is_empty()) {
        None => path_parameters.clone(),
        Some(extracted) => {
            let mut kw: Map<String, Value> =
                if !signature.accepts_arbitrary_named() && !signature.named().is_empty() {
                    extracted
                        .iter()
                        .filter(|(k, _)| signature.is_named(k))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                } else {
                    extracted.clone()
                };

            for (key, value) in &path_parameters {
                if kw.contains_key(key) {
                    warn!(
                        handler = entry.handler.name(),
                        argument = %key,
                        "Duplicate arg name in path and request arguments: {}",
                        key
                    );
                    collisions.push(key.clone());
                }
                kw.insert(key.clone(), value.clone());
            }
            kw
        }
    };

    // The raw request owns the reserved name.
    if signature.wants_request() {
        merged_arguments.remove(REQUEST_ARG);
    }

    if let Some(missing) = signature
        .required()
        .iter()
        .find(|name| !merged_arguments.contains_key(name.as_str()))
    {
        return Err(Error::BadRequest(format!("Missing argument: {}", missing)));
    }

    Ok(CallContext {
        body_parameters,
        path_parameters,
        merged_arguments,
        collisions,
    })
}

/// Run `entry` for `request`.
///
/// Returns `Err` for request validation faults (always `BadRequest`) and for
/// any handler fault other than a domain API error.
pub async fn handle(entry: &RouteEntry, request: HttpRequest) -> Result<Reply, Error> {
    let context = prepare(entry, &request)?;
    debug!(
        method = %entry.method,
        path = %entry.path,
        handler = entry.handler.name(),
        arguments = context.merged_arguments.len(),
        "call handler"
    );

    let mut args = Arguments::from_map(context.merged_arguments);
    if entry.signature.wants_request() {
        args.set_request(request);
    }

    match entry.handler.call(args).await {
        Err(Error::Api(err)) => {
            debug!(handler = entry.handler.name(), error = %err, "api error");
            Ok(Reply::Json(err.to_payload()))
        }
        result => result,
    }
}
