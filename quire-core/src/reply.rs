// Handler return values and their conversion to HTTP responses

use crate::{Error, HttpResponse, HttpStatus, TemplateRenderer};
use serde::Serialize;
use serde_json::Value;

const REDIRECT_PREFIX: &str = "redirect:";

/// What a handler produced, before rendering
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// Plain text. `redirect:<url>` is turned into a 302.
    Text(String),
    Html(String),
    Redirect(String),
    Template { name: String, context: Value },
    Status(u16),
    Response(HttpResponse),
}

impl Reply {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(Reply::Json(serde_json::to_value(value)?))
    }

    pub fn template(name: impl Into<String>, context: Value) -> Self {
        Reply::Template {
            name: name.into(),
            context,
        }
    }

    /// Render into a response. Templates need a renderer.
    pub fn into_response(
        self,
        renderer: Option<&dyn TemplateRenderer>,
    ) -> Result<HttpResponse, Error> {
        match self {
            Reply::Json(value) => HttpResponse::ok().with_json(&value),
            Reply::Text(text) => match text.strip_prefix(REDIRECT_PREFIX) {
                Some(location) => Ok(HttpResponse::redirect(location.trim())),
                None => Ok(HttpResponse::text(text)),
            },
            Reply::Html(html) => Ok(HttpResponse::html(html)),
            Reply::Redirect(location) => Ok(HttpResponse::redirect(location)),
            Reply::Template { name, context } => {
                let renderer = renderer.ok_or_else(|| {
                    Error::Template(format!("no template renderer for '{}'", name))
                })?;
                Ok(HttpResponse::html(renderer.render(&name, &context)?))
            }
            Reply::Status(code) => Ok(HttpResponse::new(code)
                .with_header("Content-Type", "text/plain;charset=utf-8")
                .with_body(HttpStatus::reason_for(code).as_bytes().to_vec())),
            Reply::Response(response) => Ok(response),
        }
    }
}

/// JSON reply wrapper for any serializable value
#[derive(Debug)]
pub struct Json<T: Serialize>(pub T);

/// Conversion from handler return types into a [`Reply`]
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, Error>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(self)
    }
}

impl IntoReply for HttpResponse {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(Reply::Response(self))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(Reply::Json(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(Reply::Text(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(Reply::Text(self.to_string()))
    }
}

impl IntoReply for HttpStatus {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(Reply::Status(self.code()))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, Error> {
        Reply::json(&self.0)
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<Error>,
{
    fn into_reply(self) -> Result<Reply, Error> {
        self.map_err(Into::into).and_then(IntoReply::into_reply)
    }
}
