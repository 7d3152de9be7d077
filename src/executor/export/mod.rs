//! Bulk data export
//!
//! The export subsystem streams a whole graph out of a datastore through
//! a server-side query cursor:
//!
//! 1. `SessionManager` opens a connection, then a cursor for the query
//! 2. `CursorPaginator` pages through the cursor, one batch per page
//! 3. `ExportCoordinator` runs the paginator against a `TurtleWriter`
//!    as a concurrent producer/consumer pair
//! 4. Cursor and connection are deleted, in that order, whatever happened
//!
//! A failure anywhere aborts the export after best-effort cleanup; output
//! already flushed to disk is left in place.

pub mod batch;
pub mod coordinator;
pub mod paginator;
pub mod progress;
pub mod writers;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{ConnectionId, CursorId, ServerClient, SessionManager};
use crate::error::{Result, TriplectlError};

pub use batch::TripleBatch;
pub use coordinator::{ExportCoordinator, ExportResult};
pub use paginator::{CursorPaginator, TripleStream};
pub use progress::ProgressTracker;
pub use writers::{BatchWriter, TurtleWriter};

/// Which facts to export from the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactDomain {
    /// Explicit and inferred facts
    All,
    /// Only explicitly asserted facts
    Explicit,
    /// Only inferred facts
    Implicit,
}

impl FactDomain {
    /// Build the export query for `graph`
    pub fn query(self, graph: &str) -> String {
        match self {
            FactDomain::All => {
                format!("SELECT ?s ?p ?o FROM <{graph}> WHERE {{ ?s ?p ?o }}")
            }
            FactDomain::Explicit => {
                format!("SELECT ?s ?p ?o FROM <{graph}> WHERE {{ ?s ?p ?o EXPLICIT TRUE }}")
            }
            FactDomain::Implicit => {
                format!("SELECT ?s ?p ?o FROM <{graph}> WHERE {{ ?s ?p ?o EXPLICIT FALSE }}")
            }
        }
    }
}

impl FromStr for FactDomain {
    type Err = TriplectlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(FactDomain::All),
            "explicit" => Ok(FactDomain::Explicit),
            "implicit" => Ok(FactDomain::Implicit),
            _ => Err(TriplectlError::InvalidArgument(
                "facts must be one of 'all', 'explicit' or 'implicit'".to_string(),
            )),
        }
    }
}

/// Parameters of one export operation
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Datastore to export from
    pub datastore: String,
    /// Graph IRI, with or without angle brackets
    pub graph: String,
    /// Fact domain to export
    pub facts: FactDomain,
    /// Output file path
    pub file: PathBuf,
    /// Page-size limit per cursor request
    pub limit: i64,
    /// Show a progress spinner
    pub progress: bool,
}

/// Strip one pair of angle-bracket delimiters from a graph IRI
fn normalize_graph(graph: &str) -> &str {
    let graph = graph.strip_prefix('<').unwrap_or(graph);
    graph.strip_suffix('>').unwrap_or(graph)
}

/// Run a complete export operation.
///
/// Validates the options, acquires a connection and cursor, runs the
/// pipeline, and releases both resources on every exit path, cursor
/// first. Cleanup failures are logged, never returned: they must not
/// displace the pipeline's own outcome.
pub async fn run_export(
    client: Arc<ServerClient>,
    options: ExportOptions,
    cancel: CancellationToken,
) -> Result<ExportResult> {
    if options.datastore.is_empty() {
        return Err(TriplectlError::InvalidArgument(
            "datastore is unset".to_string(),
        ));
    }

    if options.graph.is_empty() {
        return Err(TriplectlError::InvalidArgument("graph is unset".to_string()));
    }

    if options.limit <= 0 {
        return Err(TriplectlError::InvalidArgument(
            "limit must be positive".to_string(),
        ));
    }

    let query = options.facts.query(normalize_graph(&options.graph));
    debug!(%query, "query built");

    let session = Arc::new(SessionManager::new(client, options.datastore.clone()));

    let connection = session.open_connection().await?;
    let result = export_with_connection(&session, &connection, &query, &options, cancel).await;

    if let Err(error) = session.close_connection(&connection).await {
        warn!(%error, "could not delete connection");
    }

    result
}

async fn export_with_connection(
    session: &Arc<SessionManager>,
    connection: &ConnectionId,
    query: &str,
    options: &ExportOptions,
    cancel: CancellationToken,
) -> Result<ExportResult> {
    let cursor = session.open_cursor(connection, query).await?;
    let result = export_with_cursor(session, connection, &cursor, options, cancel).await;

    if let Err(error) = session.close_cursor(connection, &cursor).await {
        warn!(%error, "could not delete cursor");
    }

    result
}

async fn export_with_cursor(
    session: &Arc<SessionManager>,
    connection: &ConnectionId,
    cursor: &CursorId,
    options: &ExportOptions,
    cancel: CancellationToken,
) -> Result<ExportResult> {
    let paginator = CursorPaginator::new(
        session.clone(),
        connection.clone(),
        cursor.clone(),
        options.limit as u64,
    )?;
    let writer = TurtleWriter::create(&options.file).await?;
    let tracker = Arc::new(ProgressTracker::new(options.progress));

    ExportCoordinator::new(Box::new(paginator), Box::new(writer), tracker, cancel)
        .execute()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::{Method, StatusCode};

    use super::*;
    use crate::client::transport::testing::{FakeTransport, created, response};
    use crate::client::Credentials;
    use crate::error::{CursorError, PaginationError};

    const HEADER: &str = "?s\t?p\t?o\n";

    fn client_with(transport: Arc<FakeTransport>) -> Arc<ServerClient> {
        Arc::new(ServerClient::new(
            transport,
            "http",
            "localhost:12110",
            Credentials::new("admin", "secret"),
        ))
    }

    fn options(dir: &tempfile::TempDir) -> ExportOptions {
        ExportOptions {
            datastore: "stock".to_string(),
            graph: "<http://example.com/g>".to_string(),
            facts: FactDomain::All,
            file: dir.path().join("export.ttl"),
            limit: 2,
            progress: false,
        }
    }

    /// Transport serving a working server: connection and cursor creation,
    /// scripted pages, and deletions.
    fn scripted_server(pages: Vec<(StatusCode, String)>) -> FakeTransport {
        let page_index = AtomicUsize::new(0);
        FakeTransport::new(move |request| {
            if request.method == Method::POST && request.url.ends_with("/connections") {
                Ok(created("/datastores/stock/connections/conn-1"))
            } else if request.method == Method::POST && request.url.ends_with("/cursors") {
                Ok(created("/datastores/stock/connections/conn-1/cursors/cur-1"))
            } else if request.method == Method::PATCH {
                let index = page_index.fetch_add(1, Ordering::SeqCst);
                let (status, body) = pages
                    .get(index)
                    .cloned()
                    .unwrap_or((StatusCode::OK, HEADER.to_string()));
                Ok(response(status, &body))
            } else if request.method == Method::DELETE {
                Ok(response(StatusCode::NO_CONTENT, ""))
            } else {
                panic!("unexpected request: {} {}", request.method, request.url)
            }
        })
    }

    fn delete_calls(transport: &FakeTransport) -> Vec<String> {
        transport
            .calls()
            .into_iter()
            .filter(|(method, _)| *method == Method::DELETE)
            .map(|(_, url)| url)
            .collect()
    }

    #[test]
    fn test_fact_domain_queries() {
        assert_eq!(
            FactDomain::All.query("http://example.com/g"),
            "SELECT ?s ?p ?o FROM <http://example.com/g> WHERE { ?s ?p ?o }"
        );
        assert_eq!(
            FactDomain::Explicit.query("g"),
            "SELECT ?s ?p ?o FROM <g> WHERE { ?s ?p ?o EXPLICIT TRUE }"
        );
        assert_eq!(
            FactDomain::Implicit.query("g"),
            "SELECT ?s ?p ?o FROM <g> WHERE { ?s ?p ?o EXPLICIT FALSE }"
        );
        assert!("everything".parse::<FactDomain>().is_err());
    }

    #[test]
    fn test_normalize_graph() {
        assert_eq!(normalize_graph("<http://g>"), "http://g");
        assert_eq!(normalize_graph("http://g"), "http://g");
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_request() {
        let transport = Arc::new(FakeTransport::new(|_| {
            panic!("no request should be issued")
        }));
        let dir = tempfile::tempdir().unwrap();

        for (field, mutate) in [
            ("datastore", Box::new(|o: &mut ExportOptions| o.datastore.clear()) as Box<dyn Fn(&mut ExportOptions)>),
            ("graph", Box::new(|o: &mut ExportOptions| o.graph.clear())),
            ("limit", Box::new(|o: &mut ExportOptions| o.limit = 0)),
            ("negative limit", Box::new(|o: &mut ExportOptions| o.limit = -10)),
        ] {
            let mut options = options(&dir);
            mutate(&mut options);
            let err = run_export(
                client_with(transport.clone()),
                options,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
            assert!(
                matches!(err, TriplectlError::InvalidArgument(_)),
                "expected InvalidArgument for {field}"
            );
        }

        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_two_pages_then_exhaustion() {
        // one page of two rows, then an empty page
        let transport = Arc::new(scripted_server(vec![
            (
                StatusCode::OK,
                format!("{HEADER}s1\tp1\to1\ns2\tp1\to2\n"),
            ),
            (StatusCode::OK, HEADER.to_string()),
        ]));
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir);

        let result = run_export(
            client_with(transport.clone()),
            opts.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.triples_exported, 2);
        assert_eq!(result.batches_written, 1);

        // exactly one open and one advance
        assert_eq!(transport.count(&Method::PATCH, "operation=open"), 1);
        assert_eq!(transport.count(&Method::PATCH, "operation=advance"), 1);

        let contents = std::fs::read_to_string(&opts.file).unwrap();
        assert_eq!(contents, "s1\n\tp1\to1\t.\ns2\n\tp1\to2\t.\n");
    }

    #[tokio::test]
    async fn test_cleanup_order_on_success() {
        let transport = Arc::new(scripted_server(vec![(StatusCode::OK, HEADER.to_string())]));
        let dir = tempfile::tempdir().unwrap();

        run_export(
            client_with(transport.clone()),
            options(&dir),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let deletes = delete_calls(&transport);
        assert_eq!(deletes.len(), 2);
        assert!(deletes[0].ends_with("/cursors/cur-1"), "cursor deleted first");
        assert!(deletes[1].ends_with("/connections/conn-1"));
    }

    #[tokio::test]
    async fn test_failed_open_page_still_cleans_up() {
        // the first page request answers 500
        let transport = Arc::new(scripted_server(vec![(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        )]));
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir);

        let err = run_export(
            client_with(transport.clone()),
            opts.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            TriplectlError::Pagination(PaginationError::BadStatus { .. })
        ));

        // cursor then connection, exactly once each
        let deletes = delete_calls(&transport);
        assert_eq!(deletes.len(), 2);
        assert!(deletes[0].contains("/cursors/"));
        assert!(!deletes[1].contains("/cursors/"));

        // the file was created but nothing was written to it
        assert_eq!(std::fs::read_to_string(&opts.file).unwrap(), "");
    }

    #[tokio::test]
    async fn test_failed_cursor_open_cleans_up_connection_only() {
        let transport = Arc::new(FakeTransport::new(|request| {
            if request.method == Method::POST && request.url.ends_with("/connections") {
                Ok(created("/datastores/stock/connections/conn-1"))
            } else if request.method == Method::POST && request.url.ends_with("/cursors") {
                Ok(response(StatusCode::FORBIDDEN, "no access"))
            } else if request.method == Method::DELETE {
                Ok(response(StatusCode::NO_CONTENT, ""))
            } else {
                panic!("unexpected request: {} {}", request.method, request.url)
            }
        }));
        let dir = tempfile::tempdir().unwrap();

        let err = run_export(
            client_with(transport.clone()),
            options(&dir),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            TriplectlError::Cursor(CursorError::BadStatus { .. })
        ));

        let deletes = delete_calls(&transport);
        assert_eq!(deletes.len(), 1);
        assert!(deletes[0].ends_with("/connections/conn-1"));
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_mask_success() {
        let page_index = AtomicUsize::new(0);
        let transport = Arc::new(FakeTransport::new(move |request| {
            if request.method == Method::POST && request.url.ends_with("/connections") {
                Ok(created("/datastores/stock/connections/conn-1"))
            } else if request.method == Method::POST && request.url.ends_with("/cursors") {
                Ok(created("/datastores/stock/connections/conn-1/cursors/cur-1"))
            } else if request.method == Method::PATCH {
                let index = page_index.fetch_add(1, Ordering::SeqCst);
                if index == 0 {
                    Ok(response(StatusCode::OK, &format!("{HEADER}a\tb\tc\n")))
                } else {
                    Ok(response(StatusCode::OK, HEADER))
                }
            } else if request.method == Method::DELETE {
                // deletions are rejected
                Ok(response(StatusCode::INTERNAL_SERVER_ERROR, "nope"))
            } else {
                panic!("unexpected request: {} {}", request.method, request.url)
            }
        }));
        let dir = tempfile::tempdir().unwrap();

        let result = run_export(
            client_with(transport.clone()),
            options(&dir),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.triples_exported, 1);
    }

    #[tokio::test]
    async fn test_malformed_rows_skipped_within_page() {
        let transport = Arc::new(scripted_server(vec![
            (
                StatusCode::OK,
                format!("{HEADER}s1\tp1\to1\nbad\trow\ns2\tp1\to2\n"),
            ),
            (StatusCode::OK, HEADER.to_string()),
        ]));
        let dir = tempfile::tempdir().unwrap();
        let opts = options(&dir);

        let result = run_export(
            client_with(transport),
            opts.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        // the valid rows of the page arrive as one batch
        assert_eq!(result.triples_exported, 2);
        assert_eq!(result.batches_written, 1);
    }
}
