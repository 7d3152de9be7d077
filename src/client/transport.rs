//! HTTP transport abstraction for server requests
//!
//! All wire traffic goes through the [`Transport`] trait so the request
//! layer can be swapped for a recording fake in tests. The production
//! implementation is a thin wrapper over a shared `reqwest` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};

use crate::error::TransportError;

/// A single request against the server's REST interface.
///
/// Only the headers the server protocol actually uses are modeled; the
/// `Authorization` value is always present and set by the caller.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub authorization: String,
    pub accept: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub body: Option<String>,
}

/// The parts of a server response the client inspects.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Executes [`ApiRequest`]s, returning the response or a transport failure.
///
/// Implementations must be shareable across tasks; the export pipeline
/// holds one handle for its whole lifetime.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport backed by `reqwest`
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .header(AUTHORIZATION, request.authorization.as_str());

        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::Request)?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(TransportError::Request)?;

        Ok(ApiResponse {
            status,
            location,
            body,
        })
    }
}
