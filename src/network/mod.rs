//! Network layer - HTTP request execution
//!
//! The transport performs the call; the executor turns its result into a
//! `ResponseRecord` or a `NetworkError`.

pub mod client;
pub mod executor;

pub use client::{create_client, ReqwestTransport, Transport, TransportResponse};
pub use executor::RequestExecutor;
