//! Triple-store CLI library
//!
//! This library provides the functionality behind the `triplectl` binary.
//! It can be used standalone to script exports against RDFox-style
//! triple-store servers.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `client`: HTTP client, session lifecycle, and one-shot requests
//! - `error`: Error types and handling
//! - `executor`: Command execution, including the export pipeline
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tokio_util::sync::CancellationToken;
//! use triplectl::client::{Credentials, HttpTransport, ServerClient};
//! use triplectl::executor::export::{self, ExportOptions, FactDomain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(Duration::from_secs(300))?;
//!     let client = Arc::new(ServerClient::new(
//!         Arc::new(transport),
//!         "https",
//!         "rdf.example.com:12110",
//!         Credentials::new("admin", "secret"),
//!     ));
//!
//!     let options = ExportOptions {
//!         datastore: "stock".to_string(),
//!         graph: "http://example.com/graph".to_string(),
//!         facts: FactDomain::All,
//!         file: "export.ttl".into(),
//!         limit: 5000,
//!         progress: false,
//!     };
//!
//!     let result = export::run_export(client, options, CancellationToken::new()).await?;
//!     println!("exported {} triples", result.triples_exported);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;

// Re-export commonly used types
pub use client::{Credentials, ServerClient, SessionManager};
pub use config::Config;
pub use error::{Result, TriplectlError};
pub use executor::export::{ExportCoordinator, ExportResult, TripleBatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
