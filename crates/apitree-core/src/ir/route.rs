use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::model::{ModelId, Resolved};
use crate::parse::extensions::Extensions;
use crate::parse::parameter::ParameterLocation;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lower-case spelling, as used for path item keys.
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

/// A response status key: an exact code, a class like `4XX`, or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCode {
    Code(u16),
    /// Leading digit of an `nXX` range.
    Range(u8),
    Default,
}

impl StatusCode {
    pub fn parse(key: &str) -> Option<Self> {
        if key == "default" {
            return Some(StatusCode::Default);
        }
        let bytes = key.as_bytes();
        if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"xx") {
            return match bytes[0] {
                b @ b'1'..=b'5' => Some(StatusCode::Range(b - b'0')),
                _ => None,
            };
        }
        match key.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Some(StatusCode::Code(code)),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            StatusCode::Code(code) => (200..300).contains(code),
            StatusCode::Range(class) => *class == 2,
            StatusCode::Default => false,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Range(class) => write!(f, "{class}XX"),
            StatusCode::Default => f.write_str("default"),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub model: Resolved<ModelId>,
    pub required: bool,
    pub content_type: Option<String>,
}

/// A request body for one media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Json {
        model: Resolved<ModelId>,
        extensions: Extensions,
    },
    Xml {
        model: Resolved<ModelId>,
        extensions: Extensions,
    },
    OctetStream {
        extensions: Extensions,
    },
    Multipart {
        model: Option<Resolved<ModelId>>,
        fields: Vec<FormField>,
        extensions: Extensions,
    },
    Other {
        model: Option<Resolved<ModelId>>,
        extensions: Extensions,
    },
}

/// Request body variants keyed by media type. Bodies are optional unless `required`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bodies {
    pub required: bool,
    pub description: Option<String>,
    pub types: IndexMap<String, Body>,
    pub extensions: Extensions,
}

impl Bodies {
    pub fn json(&self) -> Option<&Body> {
        self.types
            .iter()
            .find(|(media, body)| matches!(body, Body::Json { .. }) && is_json(media))
            .map(|(_, body)| body)
    }

    pub fn multipart(&self) -> Option<&Body> {
        self.types
            .values()
            .find(|body| matches!(body, Body::Multipart { .. }))
    }
}

/// `application/json` or any `+json` structured syntax suffix.
pub fn is_json(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

/// A typed parameter. Required and nullable are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Input {
    pub name: String,
    pub location: ParameterLocation,
    pub model: Resolved<ModelId>,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// The payload of one response status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnType {
    /// `None` when the response declares no content.
    pub model: Option<Resolved<ModelId>>,
    pub media_type: Option<String>,
    pub description: Option<String>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Returns {
    pub types: IndexMap<StatusCode, ReturnType>,
    pub extensions: Extensions,
}

impl Returns {
    /// The first success response in document order.
    pub fn success(&self) -> Option<(StatusCode, &ReturnType)> {
        self.types
            .iter()
            .find(|(status, _)| status.is_success())
            .map(|(status, ret)| (*status, ret))
    }
}

/// One API operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Explicit `operationId`, or the name derived from method and path.
    pub operation_id: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub body: Bodies,
    pub input: Vec<Input>,
    pub returns: Returns,
    pub extensions: Extensions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_keys() {
        assert_eq!(StatusCode::parse("200"), Some(StatusCode::Code(200)));
        assert_eq!(StatusCode::parse("4XX"), Some(StatusCode::Range(4)));
        assert_eq!(StatusCode::parse("2xx"), Some(StatusCode::Range(2)));
        assert_eq!(StatusCode::parse("default"), Some(StatusCode::Default));
        assert_eq!(StatusCode::parse("ok"), None);
        assert_eq!(StatusCode::parse("700"), None);
        assert_eq!(StatusCode::Range(5).to_string(), "5XX");
    }

    #[test]
    fn recognises_json_media_types() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/merge-patch+json"));
        assert!(!is_json("application/xml"));
    }
}
