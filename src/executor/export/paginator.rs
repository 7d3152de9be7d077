//! Cursor pagination over the server's page-at-a-time protocol
//!
//! The paginator drives one open cursor: the first page request carries
//! `operation=open`, every later one `operation=advance`, until a page
//! yields zero valid rows. Consumers pull batches through the
//! [`TripleStream`] trait so the pipeline can be tested without a server.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{ConnectionId, CursorId, CursorOp, SessionManager};
use crate::error::{Result, TriplectlError};

use super::batch::TripleBatch;

/// Pull-based source of triple batches
#[async_trait]
pub trait TripleStream: Send {
    /// Fetch the next batch, or `None` once the source is exhausted
    async fn next_batch(&mut self) -> Result<Option<TripleBatch>>;
}

/// One parsed page
pub(crate) struct PageParse {
    pub batch: TripleBatch,
    pub skipped: usize,
}

/// Parse one tab-separated page body into a batch.
///
/// The first line is a header and is discarded unconditionally, for open
/// and advance responses alike. Data rows have exactly three fields;
/// anything else is counted as skipped.
pub(crate) fn parse_page(body: &str) -> PageParse {
    let mut batch = TripleBatch::new();
    let mut skipped = 0;

    let mut lines = body.lines();
    lines.next();

    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            skipped += 1;
            continue;
        }

        batch.insert(fields[0], fields[1], fields[2]);
    }

    PageParse { batch, skipped }
}

/// Pages through an open cursor until the server reports no further rows
pub struct CursorPaginator {
    session: Arc<SessionManager>,
    connection: ConnectionId,
    cursor: CursorId,
    limit: u64,
    next_op: CursorOp,
    finished: bool,
    triples_fetched: u64,
    rows_skipped: u64,
}

impl std::fmt::Debug for CursorPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorPaginator")
            .field("connection", &self.connection)
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .field("next_op", &self.next_op)
            .field("finished", &self.finished)
            .field("triples_fetched", &self.triples_fetched)
            .field("rows_skipped", &self.rows_skipped)
            .finish()
    }
}

impl CursorPaginator {
    /// Create a paginator over an already-open cursor.
    ///
    /// `limit` is the page-size cap sent with every request and must be
    /// positive.
    pub fn new(
        session: Arc<SessionManager>,
        connection: ConnectionId,
        cursor: CursorId,
        limit: u64,
    ) -> Result<Self> {
        if limit == 0 {
            return Err(TriplectlError::InvalidArgument(
                "page limit must be positive".to_string(),
            ));
        }

        Ok(Self {
            session,
            connection,
            cursor,
            limit,
            next_op: CursorOp::Open,
            finished: false,
            triples_fetched: 0,
            rows_skipped: 0,
        })
    }

    /// Malformed rows encountered so far
    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }
}

#[async_trait]
impl TripleStream for CursorPaginator {
    async fn next_batch(&mut self) -> Result<Option<TripleBatch>> {
        if self.finished {
            return Ok(None);
        }

        let page = self
            .session
            .fetch_page(&self.connection, &self.cursor, self.next_op, self.limit)
            .await;

        let body = match page {
            Ok(body) => body,
            Err(error) => {
                // terminal: a failed page request ends the pagination
                self.finished = true;
                return Err(error);
            }
        };

        let PageParse { batch, skipped } = parse_page(&body);

        if skipped > 0 {
            self.rows_skipped += skipped as u64;
            warn!(skipped, cursor = %self.cursor, "skipped malformed rows in page");
        }

        if batch.is_empty() {
            self.finished = true;
            debug!(total = self.triples_fetched, "no more data to process");
            return Ok(None);
        }

        self.triples_fetched += batch.len() as u64;
        self.next_op = CursorOp::Advance;

        debug!(
            triples = batch.len(),
            total = self.triples_fetched,
            "processed page"
        );

        Ok(Some(batch))
    }
}
