//! One-shot maintenance commands

use reqwest::Method;
use tracing::debug;

use crate::client::ServerClient;
use crate::error::{ApiError, Result};

impl ServerClient {
    /// Compact a datastore, returning the server's response payload
    pub async fn compact(&self, datastore: &str) -> Result<String> {
        let url = format!("{}/commands", self.base_url());
        let command = format!("active {datastore}\ncompact");

        debug!(%command, "sending compact command");

        let mut request = self.request(Method::POST, url);
        request.content_type = Some("text/plain");
        request.body = Some(command);

        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if !response.status.is_success() {
            return Err(ApiError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        Ok(response.body)
    }

    /// Import axioms from one graph into another within a datastore.
    ///
    /// Returns the server's response lines.
    pub async fn import_axioms(
        &self,
        datastore: &str,
        source_graph: &str,
        destination_graph: &str,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/datastores/{}/content?operation=add-axioms&source-graph={}&destination-graph={}",
            self.base_url(),
            datastore,
            source_graph,
            destination_graph
        );

        let request = self.request(Method::PATCH, url);
        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != reqwest::StatusCode::OK {
            return Err(ApiError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        Ok(response
            .body
            .lines()
            .map(|line| line.trim().to_string())
            .collect())
    }
}
