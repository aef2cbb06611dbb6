//! Error types for trackup-core

use std::fmt;

/// Result type alias for trackup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for trackup operations
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration (bad base URL, missing required field)
    Config(String),

    /// The tracker rejected or could not execute the issue query
    Query(String),

    /// A per-issue mutation call failed (transition, comment, field, versions)
    Update(String),

    /// HTTP transport error (connection refused, TLS, timeout)
    Http(String),

    /// JSON encode/decode error
    Json(String),

    /// I/O error
    Io(std::io::Error),

    /// Runtime error (Tokio, threading, etc.)
    Runtime(String),

    /// Other errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
            Error::Update(msg) => write!(f, "Update error: {}", msg),
            Error::Http(msg) => write!(f, "HTTP error: {}", msg),
            Error::Json(msg) => write!(f, "JSON error: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Invalid configuration
    Config,
    /// Query rejected or failed
    Query,
    /// Per-issue mutation failed
    Update,
    /// HTTP transport error
    Http,
    /// JSON encode/decode error
    Json,
    /// I/O operation error
    Io,
    /// Runtime error
    Runtime,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind — zero allocation, returns a Copy enum.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Query(_) => ErrorKind::Query,
            Error::Update(_) => ErrorKind::Update,
            Error::Http(_) => ErrorKind::Http,
            Error::Json(_) => ErrorKind::Json,
            Error::Io(_) => ErrorKind::Io,
            Error::Runtime(_) => ErrorKind::Runtime,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Borrow the error message — zero allocation.
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Error::Config(msg)
            | Error::Query(msg)
            | Error::Update(msg)
            | Error::Http(msg)
            | Error::Json(msg)
            | Error::Runtime(msg)
            | Error::Other(msg) => msg,
            Error::Io(_) => "I/O error",
        }
    }

    /// Connection-level failures are fail-fast gated separately from
    /// query rejection, so the distinction matters at the orchestration
    /// boundary.
    #[inline]
    pub const fn is_connection(&self) -> bool {
        matches!(self.kind(), ErrorKind::Http)
    }
}
