//! Error taxonomy for a console send
//!
//! `MissingParameter`, `InvalidBody` and `NoServer` are detected before any
//! network I/O. `Network` means the call itself could not complete. A
//! response that arrived but could not be decoded is not an error at all:
//! it is surfaced as a `ResponseRecord` carrying a `ResponsePayloadError`.

use thiserror::Error;

use crate::models::ParameterDescriptor;

/// A path template still contains `{...}` after substitution
#[derive(Clone, Debug, PartialEq, Error)]
#[error("missing path parameters {unresolved:?} in {template}")]
pub struct MissingParameterError {
    pub template: String,
    /// Placeholder names left in the template, in order of appearance
    pub unresolved: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
}

/// The editor text is not valid JSON
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid request body at line {line}, column {column}: {message}")]
pub struct InvalidBodyError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for InvalidBodyError {
    fn from(e: serde_json::Error) -> Self {
        InvalidBodyError {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    /// The request could not be built (bad URL, illegal header)
    InvalidRequest,
    Other,
}

/// Transport-level failure; no response was obtained
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        NetworkError {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::new(NetworkErrorKind::Timeout, format!("Request timed out: {}", e))
        } else if e.is_connect() {
            NetworkError::new(NetworkErrorKind::Connect, format!("Connection failed: {}", e))
        } else if e.is_builder() {
            NetworkError::new(NetworkErrorKind::InvalidRequest, format!("Invalid request: {}", e))
        } else {
            NetworkError::new(NetworkErrorKind::Other, format!("Request failed: {}", e))
        }
    }
}

/// Response body present but not decodable as its declared type
#[derive(Clone, Debug, PartialEq, Error)]
#[error("response declared {content_type} but could not be parsed: {message}")]
pub struct ResponsePayloadError {
    pub content_type: String,
    pub message: String,
}

/// Every way a console send can fail
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),
    #[error(transparent)]
    InvalidBody(#[from] InvalidBodyError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("server index {index} out of range ({available} servers declared)")]
    NoServer { index: usize, available: usize },
    /// The send was dropped while in flight
    #[error("request cancelled")]
    Cancelled,
}

impl ConsoleError {
    /// True for failures caught before any request left the process
    pub fn is_pre_send(&self) -> bool {
        matches!(
            self,
            ConsoleError::MissingParameter(_) | ConsoleError::InvalidBody(_) | ConsoleError::NoServer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_body_keeps_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\":").unwrap_err();
        let body_err = InvalidBodyError::from(err);
        assert_eq!(body_err.line, 1);
        assert!(body_err.column > 0);
    }

    #[test]
    fn only_input_errors_are_pre_send() {
        assert!(ConsoleError::NoServer { index: 1, available: 0 }.is_pre_send());
        assert!(!ConsoleError::Cancelled.is_pre_send());
        let network = NetworkError::new(NetworkErrorKind::Timeout, "slow");
        assert!(!ConsoleError::from(network).is_pre_send());
    }

    #[test]
    fn only_network_errors_happen_after_send() {
        let net = ConsoleError::from(NetworkError::new(NetworkErrorKind::Connect, "refused"));
        assert!(!net.is_pre_send());
        let missing = ConsoleError::NoServer { index: 2, available: 1 };
        assert!(missing.is_pre_send());
        assert_eq!(
            missing.to_string(),
            "server index 2 out of range (1 servers declared)"
        );
    }
}
