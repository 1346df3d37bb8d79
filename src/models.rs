use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::error::ResponsePayloadError;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Case-insensitive parse; `None` for methods the console cannot send
    pub fn parse(s: &str) -> Option<HttpMethod> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "PATCH" => Some(HttpMethod::PATCH),
            "DELETE" => Some(HttpMethod::DELETE),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    /// Read-only methods send their body value in the query string instead.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD | HttpMethod::OPTIONS)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter location in request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// One declared parameter and the value the user has typed for it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, location: ParameterLocation, value: impl Into<String>) -> Self {
        ParameterDescriptor {
            name: name.into(),
            location,
            value: value.into(),
            required: false,
            description: None,
        }
    }

    pub fn path(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path, value)
    }

    pub fn query(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query, value)
    }
}

/// Request body declaration: candidate media types and the selected one
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub media_types: Vec<String>,
    #[serde(default)]
    pub active: usize,
    /// Sample payload used to seed the editor
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl BodyDescriptor {
    pub fn json() -> Self {
        BodyDescriptor {
            media_types: vec![DEFAULT_CONTENT_TYPE.to_string()],
            ..Default::default()
        }
    }

    pub fn active_media_type(&self) -> Option<&str> {
        self.media_types.get(self.active).map(String::as_str)
    }
}

/// The declarative description of one API operation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    /// Path template (e.g., "/pets/{id}")
    pub path: String,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub body: Option<BodyDescriptor>,
    #[serde(default)]
    pub servers: Vec<String>,
    /// Ids of the security schemes this operation accepts
    #[serde(default)]
    pub security: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        OperationDescriptor {
            method,
            path: path.into(),
            operation_id: None,
            summary: None,
            parameters: Vec::new(),
            body: None,
            servers: Vec::new(),
            security: Vec::new(),
            deprecated: false,
        }
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// Mutable access by name, used by callers editing parameter values
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut ParameterDescriptor> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Returns display title for the operation
    pub fn display_title(&self) -> String {
        self.summary
            .clone()
            .or_else(|| self.operation_id.clone())
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }
}

/// How a security scheme's credential turns into a header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeKind {
    Bearer,
    Basic,
    ApiKey { header: String },
    /// Header named after the scheme id itself
    Named,
}

/// A named authentication mechanism and its configured credential
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    pub id: String,
    pub kind: SchemeKind,
    #[serde(default)]
    pub token: Option<String>,
}

impl SecurityScheme {
    pub fn new(id: impl Into<String>, kind: SchemeKind) -> Self {
        SecurityScheme {
            id: id.into(),
            kind,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Response body after content negotiation
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Body rendered for display: pretty JSON, raw text, or nothing
    pub fn display(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Empty => String::new(),
        }
    }
}

/// Normalized outcome of one executed request
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseRecord {
    pub body: ResponseBody,
    /// Set when the response declared JSON but the body did not parse
    pub payload_error: Option<ResponsePayloadError>,
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub redirected: bool,
    pub headers: IndexMap<String, String>,
    pub url: String,
    pub curl: String,
    pub elapsed_ms: u64,
}

impl ResponseRecord {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}
