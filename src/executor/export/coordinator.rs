//! Export pipeline coordinator
//!
//! Runs the paginator as a producer and a batch writer as a consumer,
//! joined by a bounded FIFO channel:
//!
//! - The producer pulls pages and sends each batch down the channel.
//!   Dropping the sender is the "producer finished" signal.
//! - The consumer, a spawned task, receives until the channel is closed
//!   *and* drained, so no enqueued batch is ever dropped on a clean
//!   shutdown, then flushes the writer.
//! - Errors from either side land in a single first-error-wins slot; a
//!   write error also cancels the shared token so the producer stops
//!   paging instead of fetching results nobody will consume.
//! - External cancellation aborts the in-flight page request promptly and
//!   surfaces as a pipeline failure.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, SerializationError, TriplectlError};

use super::batch::TripleBatch;
use super::paginator::TripleStream;
use super::progress::ProgressTracker;
use super::writers::BatchWriter;

/// Batches buffered between producer and consumer
const CHANNEL_CAPACITY: usize = 8;

/// Result of a completed export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Number of triples exported
    pub triples_exported: u64,
    /// Number of batches written
    pub batches_written: u64,
    /// Output file size in bytes
    pub file_size_bytes: u64,
    /// Time taken for the export
    pub elapsed_ms: u64,
}

/// First-error-wins slot shared by producer and consumer.
///
/// The first recorded error becomes the pipeline's outcome; later ones
/// are logged and discarded.
#[derive(Clone, Default)]
struct ErrorSlot(Arc<Mutex<Option<TriplectlError>>>);

impl ErrorSlot {
    fn record(&self, error: TriplectlError) {
        let mut slot = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if slot.is_none() {
            *slot = Some(error);
        } else {
            warn!(discarded = %error, "pipeline error already recorded");
        }
    }

    fn take(&self) -> Option<TriplectlError> {
        match self.0.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Coordinator for export operations
pub struct ExportCoordinator {
    stream: Box<dyn TripleStream>,
    writer: Box<dyn BatchWriter>,
    tracker: Arc<ProgressTracker>,
    cancel: CancellationToken,
}

impl ExportCoordinator {
    pub fn new(
        stream: Box<dyn TripleStream>,
        writer: Box<dyn BatchWriter>,
        tracker: Arc<ProgressTracker>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            stream,
            writer,
            tracker,
            cancel,
        }
    }

    /// Run the pipeline to completion.
    ///
    /// Returns export statistics on success, or the first error recorded
    /// by either side.
    pub async fn execute(self) -> Result<ExportResult> {
        let started = Instant::now();
        let errors = ErrorSlot::default();

        info!("starting export");

        let (tx, rx) = mpsc::channel::<TripleBatch>(CHANNEL_CAPACITY);

        let consumer = tokio::spawn(consume(
            rx,
            self.writer,
            self.tracker.clone(),
            errors.clone(),
            self.cancel.clone(),
        ));

        produce(self.stream, tx, &errors, &self.cancel).await;

        let outcome = consumer.await;
        self.tracker.finish();

        let (triples, batches, file_size) = match outcome {
            Ok(counts) => counts,
            Err(join_error) => {
                errors.record(SerializationError::TaskFailed(join_error.to_string()).into());
                (0, 0, 0)
            }
        };

        if let Some(error) = errors.take() {
            return Err(error);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            triples,
            batches, file_size, elapsed_ms, "export complete"
        );

        Ok(ExportResult {
            triples_exported: triples,
            batches_written: batches,
            file_size_bytes: file_size,
            elapsed_ms,
        })
    }
}

/// Pull pages from the stream and feed the channel until exhaustion,
/// failure, or cancellation. Dropping `tx` on return signals completion
/// to the consumer in every case, so it never blocks forever.
async fn produce(
    mut stream: Box<dyn TripleStream>,
    tx: mpsc::Sender<TripleBatch>,
    errors: &ErrorSlot,
    cancel: &CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                errors.record(TriplectlError::Cancelled);
                break;
            }
            next = stream.next_batch() => next,
        };

        match next {
            Ok(Some(batch)) => {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        errors.record(TriplectlError::Cancelled);
                        break;
                    }
                    sent = tx.send(batch) => sent,
                };

                if sent.is_err() {
                    // receiver gone: the consumer recorded its error first
                    debug!("consumer stopped receiving - ending pagination");
                    break;
                }
            }
            Ok(None) => {
                debug!("pagination exhausted");
                break;
            }
            Err(error) => {
                // no cancel here: batches already queued must still drain
                errors.record(error);
                break;
            }
        }
    }
}

/// Drain the channel into the writer. Receives until the channel is
/// closed and empty, so every batch the producer managed to enqueue is
/// written before completion is declared.
async fn consume(
    mut rx: mpsc::Receiver<TripleBatch>,
    mut writer: Box<dyn BatchWriter>,
    tracker: Arc<ProgressTracker>,
    errors: ErrorSlot,
    cancel: CancellationToken,
) -> (u64, u64, u64) {
    let mut triples = 0u64;
    let mut batches = 0u64;

    while let Some(batch) = rx.recv().await {
        match writer.write_batch(&batch).await {
            Ok(count) => {
                triples += count as u64;
                batches += 1;
                tracker.update(triples);
            }
            Err(error) => {
                errors.record(error);
                cancel.cancel();
                break;
            }
        }
    }

    if let Err(error) = writer.finalize().await {
        errors.record(error);
    }

    let file_size = writer.file_size().await.unwrap_or(0);

    (triples, batches, file_size)
}
