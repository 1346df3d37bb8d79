//! Request engine - turns an operation description into a concrete request
//!
//! Path resolution, query composition and header merging are pure functions;
//! `build_request` combines them into a `RequestSpec`.

pub mod headers;
pub mod path;
pub mod query;
pub mod spec;

pub use headers::{compose_headers, security_headers, HeaderSet};
pub use path::resolve_path;
pub use query::{append_query, compose_query};
pub use spec::{build_request, parse_body_text, RequestContext, RequestSpec};
