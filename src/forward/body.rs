//! Inbound token request bodies.
//!
//! Clients post either JSON, an urlencoded form, or an opaque string. All
//! three collapse into [`InboundBody`] before the token forwarder re-encodes
//! them.

use serde_json::Value;

/// The shape of a token request body as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundBody {
    /// Key/value fields, in the order the client sent them.
    Structured(Vec<(String, String)>),
    /// A body forwarded byte-for-byte.
    Raw(String),
    /// No body, or a mapping with no fields.
    Empty,
}

/// Why an inbound body could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum InboundBodyError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    NotAnObject,

    #[error("body is not valid UTF-8")]
    NotUtf8,
}

impl InboundBody {
    /// Interpret raw body bytes using the declared content type.
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Result<Self, InboundBodyError> {
        if bytes.is_empty() {
            return Ok(Self::Empty);
        }

        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if essence == "application/json" || essence.ends_with("+json") {
            return match serde_json::from_slice::<Value>(bytes)? {
                Value::Object(map) => Ok(Self::from_fields(
                    map.into_iter().map(|(k, v)| (k, render_value(v))).collect(),
                )),
                _ => Err(InboundBodyError::NotAnObject),
            };
        }

        if essence == "application/x-www-form-urlencoded" {
            return Ok(Self::from_fields(merge_repeated(
                url::form_urlencoded::parse(bytes).into_owned(),
            )));
        }

        std::str::from_utf8(bytes)
            .map(|raw| Self::Raw(raw.to_string()))
            .map_err(|_| InboundBodyError::NotUtf8)
    }

    fn from_fields(fields: Vec<(String, String)>) -> Self {
        if fields.is_empty() {
            Self::Empty
        } else {
            Self::Structured(fields)
        }
    }
}

/// Render a JSON field the way it appears in a form body.
///
/// Arrays are flattened to comma-separated items; objects keep their JSON text.
fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Collapse repeated form keys into one field at the first key's position,
/// values joined with `,`.
fn merge_repeated(pairs: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    for (key, value) in pairs {
        match fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, joined)) => {
                joined.push(',');
                joined.push_str(&value);
            }
            None => fields.push((key, value)),
        }
    }
    fields
}
