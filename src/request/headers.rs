//! Header composition
//!
//! Sources merge in increasing precedence: caller-supplied headers, the
//! computed content type, then one header per credentialed security scheme.
//! Both the wire headers and the curl `-H` arguments are read from the same
//! `HeaderSet`, so they cannot diverge.

use std::collections::HashMap;

use base64::Engine;
use indexmap::IndexMap;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::curl::shell_quote;
use crate::models::{OperationDescriptor, SchemeKind, SecurityScheme};

/// Ordered, case-normalized header mapping. Keys are lowercase and unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: IndexMap<String, String>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an existing name keeps its position.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.trim().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `"name: value"` lines, each shell-quoted for a curl `-H` flag
    pub fn curl_flags(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| shell_quote(&format!("{}: {}", name, value)))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.set(name.as_ref(), value);
        }
        set
    }
}

/// Headers contributed by the operation's credentialed security schemes.
///
/// References without a known scheme or without a token contribute nothing.
pub fn security_headers(operation: &OperationDescriptor, schemes: &[SecurityScheme]) -> HeaderSet {
    let by_id: HashMap<&str, &SecurityScheme> =
        schemes.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut headers = HeaderSet::new();
    for id in &operation.security {
        let Some(scheme) = by_id.get(id.as_str()) else {
            continue;
        };
        let Some(token) = scheme.token.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        match &scheme.kind {
            SchemeKind::Bearer => headers.set("Authorization", format!("Bearer {}", token)),
            SchemeKind::Basic => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(token);
                headers.set("Authorization", format!("Basic {}", encoded));
            }
            SchemeKind::ApiKey { header } => headers.set(header, token),
            SchemeKind::Named => headers.set(&scheme.id, token),
        }
    }
    headers
}

/// Merge all header sources for one send.
pub fn compose_headers(
    operation: &OperationDescriptor,
    additional: &IndexMap<String, String>,
    schemes: &[SecurityScheme],
) -> HeaderSet {
    let mut headers: HeaderSet = additional.iter().map(|(k, v)| (k, v.clone())).collect();

    let content_type = operation
        .body
        .as_ref()
        .and_then(|b| b.active_media_type())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    headers.set("Content-Type", content_type);

    for (name, value) in security_headers(operation, schemes).iter() {
        headers.set(name, value);
    }
    headers
}
