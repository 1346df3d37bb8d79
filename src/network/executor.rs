//! Request executor - sends a `RequestSpec` and normalizes the outcome
//!
//! A completed call always yields a `ResponseRecord`, whatever its status.
//! Only transport failures become `Err(NetworkError)`.

use std::time::Instant;

use crate::error::{NetworkError, ResponsePayloadError};
use crate::models::{ResponseBody, ResponseRecord};
use crate::network::client::{Transport, TransportResponse};
use crate::request::RequestSpec;

pub struct RequestExecutor<T: Transport> {
    transport: T,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T) -> Self {
        RequestExecutor { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue exactly one call for `spec`. The curl text is taken from the
    /// same spec that goes on the wire.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ResponseRecord, NetworkError> {
        let curl = spec.to_curl();
        let start = Instant::now();
        let raw = self.transport.send(spec).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(normalize(raw, curl, elapsed_ms))
    }
}

/// Build the record for a completed call
pub fn normalize(raw: TransportResponse, curl: String, elapsed_ms: u64) -> ResponseRecord {
    let content_type = raw.headers.get("content-type").cloned();
    let (body, payload_error) = decode_body(content_type.as_deref(), raw.body);

    ResponseRecord {
        body,
        payload_error,
        ok: (200..300).contains(&raw.status),
        status: raw.status,
        status_text: raw.status_text,
        redirected: is_redirect(raw.status),
        headers: raw.headers,
        url: raw.url,
        curl,
        elapsed_ms,
    }
}

/// 3xx other than 304 Not Modified, which is a cache answer rather than a redirect
fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status) && status != 304
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime == "text/json" || mime.ends_with("+json")
}

/// Declared JSON must parse or the record carries a payload error.
/// Without a content type the body is parsed opportunistically.
fn decode_body(content_type: Option<&str>, text: String) -> (ResponseBody, Option<ResponsePayloadError>) {
    if text.trim().is_empty() {
        return (ResponseBody::Empty, None);
    }

    match content_type {
        Some(ct) if is_json_content_type(ct) => match serde_json::from_str(&text) {
            Ok(value) => (ResponseBody::Json(value), None),
            Err(e) => {
                let error = ResponsePayloadError {
                    content_type: ct.to_string(),
                    message: e.to_string(),
                };
                (ResponseBody::Text(text), Some(error))
            }
        },
        Some(_) => (ResponseBody::Text(text), None),
        None => match serde_json::from_str(&text) {
            Ok(value) => (ResponseBody::Json(value), None),
            Err(_) => (ResponseBody::Text(text), None),
        },
    }
}
