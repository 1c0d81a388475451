//! Query string, URL-encoded form and multipart decoding
//!
//! Every decoder here produces a flat `name -> value` mapping. When a key is
//! repeated, the first occurrence wins and later ones are discarded.

use crate::Error;
use memchr::memmem;
use serde_json::{Map, Value, json};

/// Decode `a=1&b=2` pairs into a flat mapping, keeping the first value per key.
pub fn parse_pairs(input: &[u8]) -> Result<Map<String, Value>, Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)
        .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))?;

    let mut map = Map::new();
    for (key, value) in pairs {
        if !map.contains_key(&key) {
            map.insert(key, Value::String(value));
        }
    }
    Ok(map)
}

/// Decode a query string (without the leading `?`)
pub fn parse_query(query: &str) -> Result<Map<String, Value>, Error> {
    parse_pairs(query.as_bytes())
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn parse_form(body: &[u8]) -> Result<Map<String, Value>, Error> {
    parse_pairs(body)
}

/// Decode a `multipart/form-data` body
pub fn parse_multipart(content_type: &str, body: &[u8]) -> Result<Map<String, Value>, Error> {
    let parser = MultipartParser::from_content_type(content_type)?;
    Ok(MultipartParser::into_map(parser.parse(body)?))
}

/// Multipart form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    /// Set for text fields
    pub value: Option<String>,
    /// Set for file fields
    pub file: Option<FormFile>,
}

/// Uploaded file data
#[derive(Debug, Clone)]
pub struct FormFile {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Vec<u8>,
}

impl FormFile {
    pub fn new(filename: String, content_type: String, data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            filename,
            content_type,
            size,
            data,
        }
    }

    /// How a file field appears among handler arguments
    pub fn describe(&self) -> Value {
        json!({
            "filename": self.filename,
            "content_type": self.content_type,
            "size": self.size,
        })
    }
}

/// Multipart form data parser
pub struct MultipartParser {
    boundary: String,
}

impl MultipartParser {
    /// Create a parser from a `multipart/form-data; boundary=..` header value
    pub fn from_content_type(content_type: &str) -> Result<Self, Error> {
        let boundary = content_type
            .split(';')
            .find_map(|part| {
                part.trim()
                    .strip_prefix("boundary=")
                    .map(|b| b.trim_matches('"').to_string())
            })
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::BadRequest("Missing boundary in Content-Type".to_string()))?;

        Ok(Self { boundary })
    }

    /// Split `body` on the boundary. File content is kept as raw bytes; only
    /// headers and text fields are decoded as UTF-8.
    pub fn parse(&self, body: &[u8]) -> Result<Vec<FormField>, Error> {
        let marker = format!("--{}", self.boundary);
        let positions: Vec<usize> = memmem::find_iter(body, marker.as_bytes()).collect();

        let mut fields = Vec::new();
        for bounds in positions.windows(2) {
            let part = &body[bounds[0] + marker.len()..bounds[1]];
            if part.starts_with(b"--") {
                break;
            }
            if part.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            fields.push(Self::parse_part(part)?);
        }
        Ok(fields)
    }

    fn parse_part(part: &[u8]) -> Result<FormField, Error> {
        let part = strip_line_break(part, true);
        let (head, content) = match memmem::find(part, b"\r\n\r\n") {
            Some(at) => (&part[..at], &part[at + 4..]),
            None => {
                let at = memmem::find(part, b"\n\n").ok_or_else(|| {
                    Error::BadRequest("Malformed multipart section".to_string())
                })?;
                (&part[..at], &part[at + 2..])
            }
        };
        let content = strip_line_break(content, false);
        let head = std::str::from_utf8(head)
            .map_err(|_| Error::BadRequest("Malformed multipart headers".to_string()))?;

        let mut name = None;
        let mut filename = None;
        let mut content_type = None;

        for line in head.lines() {
            let Some((header, value)) = line.split_once(':') else {
                continue;
            };
            let header = header.trim();
            if header.eq_ignore_ascii_case("content-disposition") {
                for attr in value.split(';').map(str::trim) {
                    if let Some(v) = attr.strip_prefix("name=") {
                        name = Some(v.trim_matches('"').to_string());
                    } else if let Some(v) = attr.strip_prefix("filename=") {
                        filename = Some(v.trim_matches('"').to_string());
                    }
                }
            } else if header.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_string());
            }
        }

        let name = name.ok_or_else(|| Error::BadRequest("Missing field name".to_string()))?;

        Ok(match filename {
            Some(filename) => FormField {
                name,
                value: None,
                file: Some(FormFile::new(
                    filename,
                    content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                    content.to_vec(),
                )),
            },
            None => {
                let value = String::from_utf8(content.to_vec()).map_err(|_| {
                    Error::BadRequest(format!("Invalid UTF-8 in field: {}", name))
                })?;
                FormField {
                    name,
                    value: Some(value),
                    file: None,
                }
            }
        })
    }

    /// Flatten parsed fields; the first field per name wins.
    pub fn into_map(fields: Vec<FormField>) -> Map<String, Value> {
        let mut map = Map::new();
        for field in fields {
            if map.contains_key(&field.name) {
                continue;
            }
            let value = match (field.value, field.file) {
                (Some(text), _) => Value::String(text),
                (None, Some(file)) => file.describe(),
                (None, None) => Value::Null,
            };
            map.insert(field.name, value);
        }
        map
    }
}

/// Drop one leading (`leading`) or trailing CRLF / LF.
fn strip_line_break(bytes: &[u8], leading: bool) -> &[u8] {
    if leading {
        bytes
            .strip_prefix(b"\r\n")
            .or_else(|| bytes.strip_prefix(b"\n"))
            .unwrap_or(bytes)
    } else {
        bytes
            .strip_suffix(b"\r\n")
            .or_else(|| bytes.strip_suffix(b"\n"))
            .unwrap_or(bytes)
    }
}
