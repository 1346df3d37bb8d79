//! HTTP transport - performs the single outbound call for a `RequestSpec`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::redirect::Policy;

use crate::error::NetworkError;
use crate::models::HttpMethod;
use crate::request::RequestSpec;

/// What came back over the wire, before body decoding
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Lowercase names; repeated headers joined with ", "
    pub headers: IndexMap<String, String>,
    pub url: String,
    pub body: String,
}

/// Sends one request. Implementations must not follow redirects.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, spec: &RequestSpec) -> Result<TransportResponse, NetworkError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, spec: &RequestSpec) -> Result<TransportResponse, NetworkError> {
        self.as_ref().send(spec).await
    }
}

/// Production transport backed by a shared reqwest client
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(ReqwestTransport {
            client: create_client(timeout)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<TransportResponse, NetworkError> {
        let method = match spec.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::HEAD => reqwest::Method::HEAD,
            HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        };

        let mut req_builder = self.client.request(method, &spec.url);
        for (name, value) in spec.headers.iter() {
            req_builder = req_builder.header(name, value);
        }
        if let Some(body) = &spec.body {
            req_builder = req_builder.body(body.clone());
        }

        let resp = req_builder.send().await?;

        let status = resp.status();
        let mut headers: IndexMap<String, String> = IndexMap::new();
        for (name, value) in resp.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        let url = resp.url().to_string();
        let body = resp.text().await?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url,
            body,
        })
    }
}

/// Create an HTTP client that never follows redirects
pub fn create_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .timeout(timeout)
        .build()
}
