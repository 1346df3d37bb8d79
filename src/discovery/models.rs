//! Data model for a loaded API document

use serde::{Deserialize, Serialize};

use crate::models::{HttpMethod, OperationDescriptor, SecurityScheme};

/// Operations, servers and security schemes read from an API document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub title: Option<String>,
    pub version: Option<String>,
    /// Document-wide server URLs
    pub servers: Vec<String>,
    pub security_schemes: Vec<SecurityScheme>,
    pub operations: Vec<OperationDescriptor>,
}

impl ApiDocument {
    /// Find an operation by `operationId` or by `"METHOD /path"`
    pub fn find_operation(&self, selector: &str) -> Option<&OperationDescriptor> {
        if let Some(op) = self
            .operations
            .iter()
            .find(|op| op.operation_id.as_deref() == Some(selector))
        {
            return Some(op);
        }

        let (method, path) = selector.trim().split_once(char::is_whitespace)?;
        let method = HttpMethod::parse(method)?;
        let path = path.trim();
        self.operations
            .iter()
            .find(|op| op.method == method && op.path == path)
    }

    /// Attach configured tokens to the document's schemes by id
    pub fn schemes_with_tokens<'a>(
        &self,
        token_for: impl Fn(&str) -> Option<&'a str>,
    ) -> Vec<SecurityScheme> {
        self.security_schemes
            .iter()
            .cloned()
            .map(|mut scheme| {
                if let Some(token) = token_for(&scheme.id) {
                    scheme.token = Some(token.to_string());
                }
                scheme
            })
            .collect()
    }
}
