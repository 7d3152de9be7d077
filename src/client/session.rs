//! Connection and cursor lifecycle management
//!
//! The server scopes all query state to a connection, and paging state to a
//! cursor owned by that connection. [`SessionManager`] owns creation and
//! deletion of both. Callers must close the cursor before the connection;
//! the export pipeline does both unconditionally once the corresponding
//! open succeeded, whatever the outcome of the export itself.
//!
//! Deletion failures are reported as [`CleanupError`] so the caller can log
//! them without letting them displace the operation's primary result.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tracing::{debug, info};

use crate::client::ServerClient;
use crate::error::{CleanupError, ConnectionError, CursorError, PaginationError, Result};

/// Server-issued identifier for one open connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-issued identifier for one open cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorId(String);

impl CursorId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operation flag for a cursor page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOp {
    Open,
    Advance,
}

impl CursorOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CursorOp::Open => "open",
            CursorOp::Advance => "advance",
        }
    }
}

/// Manages server-side connection and cursor resources for one datastore
pub struct SessionManager {
    client: Arc<ServerClient>,
    datastore: String,
}

impl SessionManager {
    pub fn new(client: Arc<ServerClient>, datastore: impl Into<String>) -> Self {
        Self {
            client,
            datastore: datastore.into(),
        }
    }

    pub fn datastore(&self) -> &str {
        &self.datastore
    }

    fn connections_url(&self) -> String {
        format!(
            "{}/datastores/{}/connections",
            self.client.base_url(),
            self.datastore
        )
    }

    /// Create a server-side connection, returning its identifier
    pub async fn open_connection(&self) -> Result<ConnectionId> {
        let url = self.connections_url();
        debug!(%url, "creating connection");

        let request = self.client.request(Method::POST, url);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(ConnectionError::Transport)?;

        if response.status != StatusCode::CREATED {
            return Err(ConnectionError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let location = response.location.ok_or(ConnectionError::MissingLocation)?;
        let id = ConnectionId(id_from_location(&location).to_string());

        info!(connection = %id, "connection created");

        Ok(id)
    }

    /// Delete a server-side connection
    pub async fn close_connection(&self, connection: &ConnectionId) -> Result<()> {
        let url = format!("{}/{}", self.connections_url(), connection);
        debug!(%url, "deleting connection");

        let request = self.client.request(Method::DELETE, url);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(CleanupError::Transport)?;

        if response.status != StatusCode::NO_CONTENT {
            return Err(CleanupError::Connection {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        info!(connection = %connection, "connection closed");

        Ok(())
    }

    /// Open a cursor for `query` on an existing connection
    pub async fn open_cursor(&self, connection: &ConnectionId, query: &str) -> Result<CursorId> {
        let url = format!("{}/{}/cursors", self.connections_url(), connection);
        debug!(%url, "creating cursor");

        let mut request = self.client.request(Method::POST, url);
        request.content_type = Some("application/sparql-query");
        request.body = Some(query.to_string());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(CursorError::Transport)?;

        if response.status != StatusCode::CREATED {
            return Err(CursorError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let location = response.location.ok_or(CursorError::MissingLocation)?;
        let id = CursorId(id_from_location(&location).to_string());

        info!(connection = %connection, cursor = %id, "cursor created");

        Ok(id)
    }

    /// Delete a cursor
    pub async fn close_cursor(&self, connection: &ConnectionId, cursor: &CursorId) -> Result<()> {
        let url = format!("{}/{}/cursors/{}", self.connections_url(), connection, cursor);
        debug!(%url, "deleting cursor");

        let request = self.client.request(Method::DELETE, url);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(CleanupError::Transport)?;

        if response.status != StatusCode::NO_CONTENT {
            return Err(CleanupError::Cursor {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        info!(cursor = %cursor, "cursor closed");

        Ok(())
    }

    /// Request one page of results from a cursor.
    ///
    /// Returns the raw tab-separated response body; parsing is the
    /// paginator's job.
    pub async fn fetch_page(
        &self,
        connection: &ConnectionId,
        cursor: &CursorId,
        op: CursorOp,
        limit: u64,
    ) -> Result<String> {
        let url = format!(
            "{}/{}/cursors/{}?operation={}&limit={}",
            self.connections_url(),
            connection,
            cursor,
            op.as_str(),
            limit
        );
        debug!(%url, "requesting page");

        let mut request = self.client.request(Method::PATCH, url);
        request.accept = Some("text/tab-separated-values");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(PaginationError::Transport)?;

        if response.status != StatusCode::OK {
            return Err(PaginationError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        Ok(response.body)
    }
}

/// Extract the resource id from a `Location` header value.
///
/// The id is the substring after the last `/`; a value without slashes is
/// taken as the id itself.
fn id_from_location(location: &str) -> &str {
    location.rsplit('/').next().unwrap_or(location)
}
