//! Error handling module for triple-store operations.
//!
//! This module provides error handling for the CLI with:
//! - One error kind per failure domain (connection, cursor, pagination, ...)
//! - A crate-wide [`Result`] alias
//! - Conversions so `?` works across module boundaries
//!
//! Cleanup failures get their own kind ([`CleanupError`]) because they are
//! logged but never returned as an operation's primary error: a failed
//! `DELETE` on a cursor or connection must not mask an export that already
//! committed its data.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ApiError, CleanupError, ConfigError, ConnectionError, CursorError, PaginationError, Result,
    SerializationError, TransportError, TriplectlError,
};
