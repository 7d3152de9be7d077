use std::{fmt, io};

use reqwest::StatusCode;

/// Crate-wide `Result` type using [`TriplectlError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, TriplectlError>;

/// Top-level error type for triplectl operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum TriplectlError {
    /// Caller-supplied parameters failed validation before any network call.
    InvalidArgument(String),

    /// Session-creation errors against the server.
    Connection(ConnectionError),

    /// Cursor-creation errors against the server.
    Cursor(CursorError),

    /// Errors while paging through cursor results.
    Pagination(PaginationError),

    /// Errors writing exported data to the output stream.
    Serialization(SerializationError),

    /// Errors deleting cursors or connections.
    ///
    /// Logged at the call site, never returned as a primary result.
    Cleanup(CleanupError),

    /// Errors from one-shot requests (roles, stats, compact, ...).
    Api(ApiError),

    /// Configuration errors.
    Config(ConfigError),

    /// HTTP transport errors outside any more specific domain.
    Transport(TransportError),

    /// I/O errors.
    Io(io::Error),

    /// The operation was cancelled before it completed.
    Cancelled,
}

/// Transport-level failures: the request never produced an HTTP status.
#[derive(Debug)]
pub enum TransportError {
    /// The underlying HTTP client reported an error.
    Request(reqwest::Error),

    /// The HTTP client could not be constructed.
    Build(reqwest::Error),

    /// Transport failure with a free-form description.
    ///
    /// Used by transports that do not sit on top of the HTTP client.
    Failed(String),
}

/// Session-creation errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// The server answered with an unexpected status.
    BadStatus { status: StatusCode, body: String },

    /// The server did not return a `Location` header for the new connection.
    MissingLocation,

    /// The request did not complete.
    Transport(TransportError),
}

/// Cursor-creation errors.
#[derive(Debug)]
pub enum CursorError {
    /// The server answered with an unexpected status.
    BadStatus { status: StatusCode, body: String },

    /// The server did not return a `Location` header for the new cursor.
    MissingLocation,

    /// The request did not complete.
    Transport(TransportError),
}

/// Errors during an open/advance page request.
#[derive(Debug)]
pub enum PaginationError {
    /// The server answered with an unexpected status.
    BadStatus { status: StatusCode, body: String },

    /// The request did not complete.
    Transport(TransportError),
}

/// Errors writing the export file.
#[derive(Debug)]
pub enum SerializationError {
    /// Creating, writing, or flushing the output stream failed.
    Io(io::Error),

    /// The writer task did not run to completion.
    TaskFailed(String),
}

/// Errors deleting a cursor or connection.
#[derive(Debug)]
pub enum CleanupError {
    /// Cursor deletion was rejected by the server.
    Cursor { status: StatusCode, body: String },

    /// Connection deletion was rejected by the server.
    Connection { status: StatusCode, body: String },

    /// The delete request did not complete.
    Transport(TransportError),
}

/// Errors from one-shot role/privilege/stats/compact requests.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with an unexpected status.
    BadStatus { status: StatusCode, body: String },

    /// The request did not complete.
    Transport(TransportError),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid config file contents.
    InvalidFormat(String),

    /// Missing required setting.
    MissingField(String),

    /// A setting has an unusable value.
    InvalidValue { field: String, value: String },

    /// The config file exists and overwriting was not requested.
    AlreadyExists(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for TriplectlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriplectlError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            TriplectlError::Connection(e) => write!(f, "connection error: {e}"),
            TriplectlError::Cursor(e) => write!(f, "cursor error: {e}"),
            TriplectlError::Pagination(e) => write!(f, "pagination error: {e}"),
            TriplectlError::Serialization(e) => write!(f, "serialization error: {e}"),
            TriplectlError::Cleanup(e) => write!(f, "cleanup error: {e}"),
            TriplectlError::Api(e) => write!(f, "{e}"),
            TriplectlError::Config(e) => write!(f, "configuration error: {e}"),
            TriplectlError::Transport(e) => write!(f, "transport error: {e}"),
            TriplectlError::Io(e) => write!(f, "I/O error: {e}"),
            TriplectlError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(e) => write!(f, "request failed: {e}"),
            TransportError::Build(e) => write!(f, "could not build HTTP client: {e}"),
            TransportError::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::BadStatus { status, body } => {
                write!(f, "bad response from server: {status} - {body}")
            }
            ConnectionError::MissingLocation => {
                write!(f, "server did not return a Location header")
            }
            ConnectionError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::BadStatus { status, body } => {
                write!(f, "bad response from server: {status} - {body}")
            }
            CursorError::MissingLocation => {
                write!(f, "server did not return a Location header")
            }
            CursorError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for PaginationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationError::BadStatus { status, body } => {
                write!(f, "bad response from server: {status} - {body}")
            }
            PaginationError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::Io(e) => write!(f, "could not write export data: {e}"),
            SerializationError::TaskFailed(msg) => write!(f, "writer task failed: {msg}"),
        }
    }
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupError::Cursor { status, body } => {
                write!(f, "could not delete cursor: {status} - {body}")
            }
            CleanupError::Connection { status, body } => {
                write!(f, "could not delete connection: {status} - {body}")
            }
            CleanupError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadStatus { status, body } => {
                write!(f, "bad response from server: {status} - {body}")
            }
            ApiError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "invalid config file: {msg}"),
            ConfigError::MissingField(field) => write!(f, "missing required setting: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "invalid value for {field}: {value}")
            }
            ConfigError::AlreadyExists(path) => {
                write!(
                    f,
                    "{path} exists - delete it manually or pass --overwrite"
                )
            }
        }
    }
}

impl std::error::Error for TriplectlError {}
impl std::error::Error for TransportError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for CursorError {}
impl std::error::Error for PaginationError {}
impl std::error::Error for SerializationError {}
impl std::error::Error for CleanupError {}
impl std::error::Error for ApiError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to TriplectlError ========================= */

impl From<io::Error> for TriplectlError {
    fn from(err: io::Error) -> Self {
        TriplectlError::Io(err)
    }
}

impl From<TransportError> for TriplectlError {
    fn from(err: TransportError) -> Self {
        TriplectlError::Transport(err)
    }
}

impl From<ConnectionError> for TriplectlError {
    fn from(err: ConnectionError) -> Self {
        TriplectlError::Connection(err)
    }
}

impl From<CursorError> for TriplectlError {
    fn from(err: CursorError) -> Self {
        TriplectlError::Cursor(err)
    }
}

impl From<PaginationError> for TriplectlError {
    fn from(err: PaginationError) -> Self {
        TriplectlError::Pagination(err)
    }
}

impl From<SerializationError> for TriplectlError {
    fn from(err: SerializationError) -> Self {
        TriplectlError::Serialization(err)
    }
}

impl From<CleanupError> for TriplectlError {
    fn from(err: CleanupError) -> Self {
        TriplectlError::Cleanup(err)
    }
}

impl From<ApiError> for TriplectlError {
    fn from(err: ApiError) -> Self {
        TriplectlError::Api(err)
    }
}

impl From<ConfigError> for TriplectlError {
    fn from(err: ConfigError) -> Self {
        TriplectlError::Config(err)
    }
}
