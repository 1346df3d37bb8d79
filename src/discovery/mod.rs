//! Discovery module - loads API operations from OpenAPI/Swagger documents

pub mod models;
pub mod openapi;

pub use models::ApiDocument;
pub use openapi::{parse_openapi, parse_openapi_value};
