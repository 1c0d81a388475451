//! Handler parameter descriptors and the signature inspector.
//!
//! A handler declares its parameters as an ordered list of [`Param`]s, either
//! by hand or through the `#[get]`/`#[post]` macros. [`HandlerSignature::inspect`]
//! classifies that list once, at registration time; the adapter only ever reads
//! the resulting record.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// How a parameter receives its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound by name from path parameters only.
    Positional,
    /// Keyword-style parameter fed from the query string or body.
    Named { required: bool },
    /// Catch-all receiving every argument not bound elsewhere.
    VarNamed,
    /// Receives the raw request. Must come last.
    Request,
}

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Positional)
    }

    /// Required named parameter
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Named { required: true })
    }

    /// Named parameter with a default
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Named { required: false })
    }

    pub fn var_named(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarNamed)
    }

    pub fn request(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Request)
    }
}

/// Invalid handler definition, detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid handler definition {handler}({params}): {reason}")]
pub struct SignatureError {
    pub handler: String,
    pub params: String,
    pub reason: String,
}

/// Classification of a handler's parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSignature {
    params: Vec<Param>,
    wants_request: bool,
    named: Vec<String>,
    required: Vec<String>,
    accepts_arbitrary_named: bool,
}

impl HandlerSignature {
    /// Classify `params` in declaration order.
    ///
    /// Fails when the request parameter is not last, when more than one
    /// request or catch-all parameter is declared, or when two parameters
    /// share a name.
    pub fn inspect(handler: &str, params: &[Param]) -> Result<Self, SignatureError> {
        let fail = |reason: String| SignatureError {
            handler: handler.to_string(),
            params: join_names(params),
            reason,
        };

        let mut signature = HandlerSignature {
            params: params.to_vec(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for param in params {
            if !seen.insert(param.name.as_str()) {
                return Err(fail(format!("duplicate parameter '{}'", param.name)));
            }
            if signature.wants_request {
                return Err(fail(format!(
                    "request parameter must be the last parameter, found '{}' after it",
                    param.name
                )));
            }

            match param.kind {
                ParamKind::Positional => {}
                ParamKind::Named { required } => {
                    signature.named.push(param.name.clone());
                    if required {
                        signature.required.push(param.name.clone());
                    }
                }
                ParamKind::VarNamed => {
                    if signature.accepts_arbitrary_named {
                        return Err(fail("at most one catch-all parameter is allowed".into()));
                    }
                    signature.accepts_arbitrary_named = true;
                }
                ParamKind::Request => signature.wants_request = true,
            }
        }

        Ok(signature)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn wants_request(&self) -> bool {
        self.wants_request
    }

    /// Named parameters, in declaration order
    pub fn named(&self) -> &[String] {
        &self.named
    }

    /// Required named parameters, in declaration order
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn accepts_arbitrary_named(&self) -> bool {
        self.accepts_arbitrary_named
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.named.iter().any(|n| n == name)
    }

    /// Whether the query string or body has to be read for a call
    pub fn needs_arguments(&self) -> bool {
        self.accepts_arbitrary_named || !self.named.is_empty() || !self.required.is_empty()
    }
}

impl fmt::Display for HandlerSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_names(&self.params))
    }
}

fn join_names(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_only_has_no_named() {
        let sig =
            HandlerSignature::inspect("get_blog", &[Param::positional("id"), Param::positional("slug")])
                .unwrap();
        assert!(sig.named().is_empty());
        assert!(sig.required().is_empty());
        assert!(!sig.accepts_arbitrary_named());
        assert!(!sig.wants_request());
        assert!(!sig.needs_arguments());
    }

    #[test]
    fn test_empty_signature() {
        let sig = HandlerSignature::inspect("health", &[]).unwrap();
        assert!(!sig.needs_arguments());
        assert_eq!(sig.to_string(), "");
    }

    #[test]
    fn test_named_classification() {
        let sig = HandlerSignature::inspect(
            "api_register",
            &[
                Param::named("email"),
                Param::optional("image"),
                Param::named("name"),
                Param::request("request"),
            ],
        )
        .unwrap();
        assert_eq!(sig.named(), ["email", "image", "name"]);
        assert_eq!(sig.required(), ["email", "name"]);
        assert!(sig.wants_request());
        assert!(sig.needs_arguments());
        assert!(sig.is_named("image"));
        assert_eq!(sig.to_string(), "email, image, name, request");
    }

    #[test]
    fn test_catch_all_alone_needs_arguments() {
        let sig = HandlerSignature::inspect("echo", &[Param::var_named("kw")]).unwrap();
        assert!(sig.accepts_arbitrary_named());
        assert!(sig.named().is_empty());
        assert!(sig.needs_arguments());
    }

    #[test]
    fn test_request_not_last_fails_for_every_permutation() {
        let others = [
            Param::positional("id"),
            Param::named("name"),
            Param::optional("page"),
            Param::var_named("kw"),
        ];

        for other in &others {
            let err = HandlerSignature::inspect(
                "bad",
                &[Param::request("request"), other.clone()],
            )
            .unwrap_err();
            assert_eq!(err.handler, "bad");
            assert!(err.reason.contains("last"), "{}", err);
        }

        // request in every position except the last of a three-parameter list
        for position in 0..2 {
            let mut params = vec![Param::positional("id"), Param::named("name")];
            params.insert(position, Param::request("request"));
            assert!(HandlerSignature::inspect("bad", &params).is_err());
        }

        let mut params = vec![Param::positional("id"), Param::named("name")];
        params.push(Param::request("request"));
        assert!(HandlerSignature::inspect("good", &params).is_ok());
    }

    #[test]
    fn test_two_catch_alls_fail() {
        let err = HandlerSignature::inspect("bad", &[Param::var_named("a"), Param::var_named("b")])
            .unwrap_err();
        assert!(err.reason.contains("catch-all"));
        assert_eq!(err.params, "a, b");
    }

    #[test]
    fn test_duplicate_names_fail() {
        let err = HandlerSignature::inspect("bad", &[Param::positional("id"), Param::named("id")])
            .unwrap_err();
        assert!(err.reason.contains("duplicate"));
    }

    #[test]
    fn test_two_requests_fail() {
        assert!(
            HandlerSignature::inspect("bad", &[Param::request("a"), Param::request("b")]).is_err()
        );
    }
}
