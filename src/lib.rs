//! # tryit-console
//!
//! Engine behind an interactive "try it now" API console.
//!
//! ## Features
//! - Path placeholder resolution with missing-parameter errors
//! - Query composition with bracket-style nested keys
//! - Header merging: configured headers, Content-Type, then auth
//! - Single HTTP call per send, redirects never followed
//! - Reproducible single-line curl command for every request
//! - OpenAPI 3 / Swagger 2 document loading
//!
//! ## Architecture
//! - Request layer - pure functions from operation to `RequestSpec`
//! - Network layer - `Transport` trait plus response normalization
//! - App layer - controller state machine publishing to subscribers

pub mod app;
pub mod config;
pub mod constants;
pub mod curl;
pub mod discovery;
pub mod error;
pub mod models;
pub mod network;
pub mod request;

// Re-export commonly used types
pub use app::{ConsoleController, ConsoleOptions, ConsoleState, SendInput, SendOutcome};
pub use config::ConsoleConfig;
pub use curl::to_curl;
pub use discovery::{parse_openapi, ApiDocument};
pub use error::{ConsoleError, InvalidBodyError, MissingParameterError, NetworkError, NetworkErrorKind};
pub use models::{
    BodyDescriptor, HttpMethod, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    ResponseBody, ResponseRecord, SchemeKind, SecurityScheme,
};
pub use network::{RequestExecutor, ReqwestTransport, Transport};
pub use request::{build_request, RequestSpec};
