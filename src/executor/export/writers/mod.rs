//! Batch writers for export output
//!
//! Writers take whole batches and append them to durable storage. The
//! trait mirrors the paginator's pull interface on the consuming side so
//! the coordinator can run against mocks in tests.

use async_trait::async_trait;

use crate::error::Result;

use super::batch::TripleBatch;

pub mod turtle;

pub use turtle::TurtleWriter;

/// Renders batches into an output stream
#[async_trait]
pub trait BatchWriter: Send {
    /// Append one batch, returning the number of triples written
    async fn write_batch(&mut self, batch: &TripleBatch) -> Result<usize>;

    /// Flush buffered output
    async fn finalize(&mut self) -> Result<()>;

    /// Size of the output artifact in bytes
    async fn file_size(&self) -> Result<u64>;
}
