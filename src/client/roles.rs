//! Role and privilege administration requests
//!
//! Thin one-shot wrappers over the server's `/roles` resources. Responses
//! are line-oriented text or CSV; the first line is a header and is always
//! discarded.

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::client::ServerClient;
use crate::error::{ApiError, Result};

/// Resource specifier → access types granted on it
pub type Privileges = BTreeMap<String, Vec<String>>;

impl ServerClient {
    /// List all role names known to the server
    pub async fn list_roles(&self) -> Result<Vec<String>> {
        let url = format!("{}/roles", self.base_url());

        let request = self.request(Method::GET, url);
        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::OK {
            return Err(bad_status(response.status, response.body));
        }

        let roles: Vec<String> = response
            .body
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect();

        debug!(count = roles.len(), "got roles");

        Ok(roles)
    }

    /// Create a role with the given password
    pub async fn create_role(&self, name: &str, password: &str) -> Result<()> {
        let url = format!("{}/roles/{}", self.base_url(), name);

        let mut request = self.request(Method::POST, url);
        request.content_type = Some("text/plain");
        request.body = Some(password.to_string());

        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::CREATED {
            return Err(bad_status(response.status, response.body));
        }

        Ok(())
    }

    /// Delete a role
    pub async fn delete_role(&self, name: &str) -> Result<()> {
        let url = format!("{}/roles/{}", self.base_url(), name);

        let request = self.request(Method::DELETE, url);
        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::NO_CONTENT {
            return Err(bad_status(response.status, response.body));
        }

        Ok(())
    }

    /// Grant datastore access types to a role
    pub async fn grant_datastore_privileges(
        &self,
        target_role: &str,
        access_types: &str,
    ) -> Result<()> {
        self.update_datastore_privileges(target_role, "grant", access_types)
            .await
    }

    /// Revoke datastore access types from a role
    pub async fn revoke_datastore_privileges(
        &self,
        target_role: &str,
        access_types: &str,
    ) -> Result<()> {
        self.update_datastore_privileges(target_role, "revoke", access_types)
            .await
    }

    async fn update_datastore_privileges(
        &self,
        target_role: &str,
        operation: &str,
        access_types: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/roles/{}/privileges?operation={}",
            self.base_url(),
            target_role,
            operation
        );
        let body = format!("resource-specifier=|datastores&access-types={access_types}");

        let mut request = self.request(Method::PATCH, url);
        request.content_type = Some("application/x-www-form-urlencoded");
        request.body = Some(body);

        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::OK {
            return Err(bad_status(response.status, response.body));
        }

        Ok(())
    }

    /// List the privileges held by a role
    pub async fn list_privileges(&self, target_role: &str) -> Result<Privileges> {
        let url = format!("{}/roles/{}/privileges", self.base_url(), target_role);

        let mut request = self.request(Method::GET, url);
        request.accept = Some("text/csv");

        let response = self.execute(request).await.map_err(ApiError::Transport)?;

        if response.status != StatusCode::OK {
            return Err(bad_status(response.status, response.body));
        }

        Ok(parse_privileges(&response.body))
    }
}

fn bad_status(status: StatusCode, body: String) -> crate::error::TriplectlError {
    ApiError::BadStatus { status, body }.into()
}

/// Parse the CSV privilege listing: header line, then
/// `resource,access-type[,access-type...]` rows.
fn parse_privileges(body: &str) -> Privileges {
    let mut privileges = Privileges::new();

    for line in body.lines().skip(1) {
        let mut parts = line.split(',').map(|p| p.trim_matches([' ', '"']));

        let Some(resource) = parts.next() else {
            continue;
        };

        let access_types: Vec<String> = parts.map(str::to_string).collect();
        privileges.insert(resource.to_string(), access_types);
    }

    privileges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privileges() {
        let body = "resource,access types\n\
                    \"|datastores\",\"read\",\"write\"\n\
                    >stock, read\n";
        let privileges = parse_privileges(body);

        assert_eq!(
            privileges.get("|datastores"),
            Some(&vec!["read".to_string(), "write".to_string()])
        );
        assert_eq!(privileges.get(">stock"), Some(&vec!["read".to_string()]));
    }

    #[test]
    fn test_parse_privileges_empty_body() {
        assert!(parse_privileges("").is_empty());
        assert!(parse_privileges("resource,access types\n").is_empty());
    }
}
