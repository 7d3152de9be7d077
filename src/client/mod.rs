//! Client layer for the triple-store server's REST interface
//!
//! This module provides:
//! - `transport`: the HTTP seam ([`Transport`]) and its `reqwest` implementation
//! - `session`: connection and cursor lifecycle management
//! - `roles`: role and privilege administration requests
//! - `stats`: server and datastore statistics
//! - `admin`: one-shot maintenance commands (compact, import-axioms)
//!
//! [`ServerClient`] bundles the endpoint, the credentials, and a transport
//! handle; everything else borrows it. The transport is injected rather
//! than looked up ambiently so tests can run against a recording fake.

pub mod admin;
pub mod roles;
pub mod session;
pub mod stats;
pub mod transport;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use tracing::debug;

use crate::error::TransportError;

pub use session::{ConnectionId, CursorId, CursorOp, SessionManager};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Role and password pair used for HTTP basic auth
#[derive(Clone)]
pub struct Credentials {
    pub role: String,
    pub password: String,
}

impl Credentials {
    pub fn new(role: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            password: password.into(),
        }
    }

    /// `Authorization` header value: `Basic base64(role:password)`
    pub fn basic_auth(&self) -> String {
        let plaintext = format!("{}:{}", self.role, self.password);
        format!("Basic {}", STANDARD.encode(plaintext))
    }
}

/// Handle to one server endpoint
///
/// Owns the scheme, host, credentials, and the transport used for every
/// request. Cheap to share via `Arc`.
pub struct ServerClient {
    transport: Arc<dyn Transport>,
    scheme: String,
    server: String,
    credentials: Credentials,
}

impl ServerClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        scheme: impl Into<String>,
        server: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            transport,
            scheme: scheme.into(),
            server: server.into(),
            credentials,
        }
    }

    /// `{scheme}://{server}` with no trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.server)
    }

    /// Build a request against `url` with the authorization header set
    pub(crate) fn request(&self, method: Method, url: String) -> ApiRequest {
        ApiRequest {
            method,
            url,
            authorization: self.credentials.basic_auth(),
            accept: None,
            content_type: None,
            body: None,
        }
    }

    /// Execute a request on the underlying transport
    pub(crate) async fn execute(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "executing request");

        let response = self.transport.execute(request).await?;

        debug!(status = %response.status, "got response from server");

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials::new("role", "password");
        // base64("role:password"), padded standard alphabet
        assert_eq!(credentials.basic_auth(), "Basic cm9sZTpwYXNzd29yZA==");
    }

    #[test]
    fn test_base_url() {
        let transport = Arc::new(transport::testing::FakeTransport::new(|_| {
            Err(TransportError::Failed("unused".to_string()))
        }));
        let client = ServerClient::new(
            transport,
            "http",
            "localhost:12110",
            Credentials::new("admin", "secret"),
        );
        assert_eq!(client.base_url(), "http://localhost:12110");
    }
}
