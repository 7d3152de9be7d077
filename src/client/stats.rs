//! Server and datastore statistics
//!
//! The server reports component statistics as tab-separated rows of
//! `(component, property, value)`. Rows are grouped into components by the
//! `Component name` property, which starts a new group.

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::client::ServerClient;
use crate::error::{ApiError, Result};

/// Component name → property → value
pub type Statistics = BTreeMap<String, BTreeMap<String, String>>;

impl ServerClient {
    /// Fetch statistics for the server, or for one datastore when given
    pub async fn get_stats(&self, datastore: Option<&str>) -> Result<Statistics> {
        let mut url = self.base_url();
        if let Some(datastore) = datastore {
            url = format!("{url}/datastores/{datastore}");
        }
        url.push_str("?component-info=extended");

        let mut request = self.request(Method::GET, url);
        request.accept = Some("*/*");

        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::OK {
            return Err(ApiError::BadStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let stats = parse_stats(&response.body);

        debug!(components = stats.len(), "parsed statistics");

        Ok(stats)
    }
}

/// Parse the tab-separated statistics body.
///
/// The first line is a header and is discarded. Property and value fields
/// arrive quoted; rows with fewer than three fields are skipped.
fn parse_stats(body: &str) -> Statistics {
    let mut stats = Statistics::new();
    let mut component = String::new();

    for line in body.lines().skip(1) {
        let fields: Vec<&str> = line.splitn(3, '\t').collect();
        if fields.len() != 3 {
            continue;
        }

        let property = fields[1].trim_matches('"');
        let value = fields[2].trim_matches('"');

        if property == "Component name" {
            component = value.to_string();
            stats.entry(component.clone()).or_default();
            continue;
        }

        stats
            .entry(component.clone())
            .or_default()
            .insert(property.to_string(), value.to_string());
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_groups_components() {
        let body = "id\tproperty\tvalue\n\
                    1\t\"Component name\"\t\"server\"\n\
                    1\t\"Version\"\t\"7.0\"\n\
                    2\t\"Component name\"\t\"datastore\"\n\
                    2\t\"Triples\"\t\"42\"\n";

        let stats = parse_stats(body);

        assert_eq!(stats.len(), 2);
        assert_eq!(
            stats["server"].get("Version"),
            Some(&"7.0".to_string())
        );
        assert_eq!(stats["datastore"].get("Triples"), Some(&"42".to_string()));
    }

    #[test]
    fn test_parse_stats_skips_short_rows() {
        let body = "header\nnot-enough-fields\n1\t\"Component name\"\t\"x\"\n";
        let stats = parse_stats(body);
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("x"));
    }
}
