//! Compile-time route path validation
//!
//! Paths use `{name}` placeholders, the syntax the route table's matcher
//! understands. Problems are reported against the attribute's span.

use proc_macro2::Span;
use syn::Error;

/// Validate a route path and return its placeholder names in order.
pub fn validate_route_path(path: &str, span: Span) -> Result<Vec<String>, Error> {
    if !path.starts_with('/') {
        return Err(Error::new(
            span,
            format!(
                "route path must start with '/', got: \"{}\"\n\
                 hint: change to \"/{}\"",
                path, path
            ),
        ));
    }

    if path.contains("//") {
        return Err(Error::new(
            span,
            format!("route path contains double slashes: \"{}\"", path),
        ));
    }

    if path.len() > 1 && path.ends_with('/') {
        return Err(Error::new(
            span,
            format!(
                "route path should not have trailing slash: \"{}\"\n\
                 hint: remove the trailing slash",
                path
            ),
        ));
    }

    let mut params: Vec<String> = Vec::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(name) = parse_parameter(segment) {
            validate_identifier(name, span)?;
            if params.iter().any(|p| p == name) {
                return Err(Error::new(
                    span,
                    format!(
                        "duplicate path parameter '{}' in route: \"{}\"",
                        name, path
                    ),
                ));
            }
            params.push(name.to_string());
        } else if segment.starts_with(':') {
            return Err(Error::new(
                span,
                format!(
                    "'{}' uses ':name' syntax; write path parameters as '{{{}}}'",
                    segment,
                    &segment[1..]
                ),
            ));
        } else {
            validate_segment(segment, span)?;
        }
    }

    Ok(params)
}

/// `{id}` -> `id`
fn parse_parameter(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
}

fn validate_identifier(name: &str, span: Span) -> Result<(), Error> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(Error::new(span, "path parameter name cannot be empty"));
    };

    if !first.is_alphabetic() && first != '_' {
        return Err(Error::new(
            span,
            format!(
                "path parameter '{}' must start with a letter or underscore",
                name
            ),
        ));
    }

    if let Some(c) = chars.find(|c| !c.is_alphanumeric() && *c != '_') {
        return Err(Error::new(
            span,
            format!(
                "path parameter '{}' contains invalid character '{}'",
                name, c
            ),
        ));
    }

    Ok(())
}

fn validate_segment(segment: &str, span: Span) -> Result<(), Error> {
    if let Some(c) = segment
        .chars()
        .find(|c| !c.is_alphanumeric() && !matches!(c, '-' | '_' | '.' | '~'))
    {
        return Err(Error::new(
            span,
            format!(
                "route segment '{}' contains invalid character '{}'\n\
                 hint: for a path parameter, use '{{name}}'",
                segment, c
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(path: &str) -> Result<Vec<String>, String> {
        validate_route_path(path, Span::call_site()).map_err(|e| e.to_string())
    }

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("/").unwrap(), Vec::<String>::new());
        assert_eq!(validate("/api/users").unwrap(), Vec::<String>::new());
        assert_eq!(validate("/blog/{id}").unwrap(), vec!["id"]);
        assert_eq!(
            validate("/api/blogs/{blog_id}/comments/{id}").unwrap(),
            vec!["blog_id", "id"]
        );
        assert!(validate("/static/robots.txt").is_ok());
    }

    #[test]
    fn test_invalid_paths() {
        assert!(validate("users").is_err());
        assert!(validate("").is_err());
        assert!(validate("/users/").is_err());
        assert!(validate("/users//posts").is_err());
        assert!(validate("/users/{}").is_err());
        assert!(validate("/users/{1id}").is_err());
        assert!(validate("/users/{id}/{id}").is_err());
        assert!(validate("/users/:id").is_err());
        assert!(validate("/users/a b").is_err());
    }
}
