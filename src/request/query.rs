//! Query-string composition
//!
//! Two contributions, in order: the body value of a read-only request
//! (flattened `a[b]=1` style) and every `query` parameter in declared order.
//! Joining always yields exactly one `?` and never a dangling `&`.

use serde_json::Value;

use crate::models::{HttpMethod, ParameterDescriptor, ParameterLocation};

/// Build the query segment (without the leading `?`).
///
/// `body` only contributes when `method` does not carry a body.
pub fn compose_query(
    method: HttpMethod,
    body: Option<&Value>,
    parameters: &[ParameterDescriptor],
) -> String {
    let mut pairs: Vec<String> = Vec::new();

    if !method.has_body() {
        if let Some(value) = body {
            encode_body_value(value, &mut pairs);
        }
    }

    for param in parameters.iter().filter(|p| p.location == ParameterLocation::Query) {
        pairs.push(format!(
            "{}={}",
            urlencoding::encode(&param.name),
            urlencoding::encode(&param.value)
        ));
    }

    pairs.join("&")
}

/// Append a query segment to a URL that may already carry one.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    if url.contains('?') {
        let separator = if url.ends_with('?') || url.ends_with('&') { "" } else { "&" };
        format!("{}{}{}", url, separator, query)
    } else {
        format!("{}?{}", url, query)
    }
}

fn encode_body_value(value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(key, child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&index.to_string(), child, pairs);
            }
        }
        // A bare scalar has no key to attach to
        _ => {}
    }
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&format!("{}[{}]", prefix, key), child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, index), child, pairs);
            }
        }
        Value::Null => pairs.push(format!("{}=", urlencoding::encode(prefix))),
        scalar => pairs.push(format!(
            "{}={}",
            urlencoding::encode(prefix),
            urlencoding::encode(&scalar_text(scalar))
        )),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
