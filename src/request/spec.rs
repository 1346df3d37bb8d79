//! Resolved request built from an operation plus user input

use indexmap::IndexMap;
use serde_json::Value;

use crate::curl;
use crate::error::{ConsoleError, InvalidBodyError};
use crate::models::{HttpMethod, OperationDescriptor, SecurityScheme};
use crate::request::headers::{compose_headers, HeaderSet};
use crate::request::path::resolve_path;
use crate::request::query::{append_query, compose_query};

/// A fully resolved outbound request. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderSet,
    /// JSON text; `None` means no body is sent at all
    pub body: Option<String>,
}

impl RequestSpec {
    /// Curl-equivalent of exactly this request
    pub fn to_curl(&self) -> String {
        curl::to_curl(self)
    }
}

/// Everything besides the operation that shapes one request
#[derive(Clone, Copy, Debug)]
pub struct RequestContext<'a> {
    pub server_index: usize,
    pub additional_headers: &'a IndexMap<String, String>,
    pub security_schemes: &'a [SecurityScheme],
}

/// Parse editor text as JSON. Blank text means "no body".
pub fn parse_body_text(text: &str) -> Result<Option<Value>, InvalidBodyError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(text)?;
    Ok(Some(value))
}

/// Resolve URL, headers and body. Fails before any I/O if the path has
/// unresolved placeholders or the selected server does not exist.
pub fn build_request(
    operation: &OperationDescriptor,
    body: Option<&Value>,
    ctx: RequestContext<'_>,
) -> Result<RequestSpec, ConsoleError> {
    let path = resolve_path(&operation.path, &operation.parameters)?;

    let server = operation
        .servers
        .get(ctx.server_index)
        .ok_or(ConsoleError::NoServer {
            index: ctx.server_index,
            available: operation.servers.len(),
        })?;

    let base = format!("{}{}", server.trim_end_matches('/'), path);
    let query = compose_query(operation.method, body, &operation.parameters);
    let url = append_query(&base, &query);

    let headers = compose_headers(operation, ctx.additional_headers, ctx.security_schemes);

    let body = if operation.method.has_body() {
        body.map(Value::to_string)
    } else {
        None
    };

    Ok(RequestSpec {
        method: operation.method,
        url,
        headers,
        body,
    })
}
