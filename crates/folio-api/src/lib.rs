use serde::{Deserialize, Serialize};
use std::fmt;

pub mod envelope;
pub mod pagination;
pub mod scroll;

// Re-export envelope types
pub use envelope::{ApiEnvelope, BulkUploadResult, FailedUpload, Page, PageMeta};

// Re-export pagination types
pub use pagination::{Filters, PaginationParams};

// Re-export scroll state types
pub use scroll::{ScrollPhase, ScrollState};

/// A record with a stable unique identifier.
///
/// Item collections are keyed by this id: the pagination engine deduplicates on it
/// and the optimistic coordinator looks items up by it.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response was received (connectivity, timeout)
    NetworkError,
    /// 4xx: caller mistake or auth/permission issue
    ClientError,
    /// 5xx: assumed transient
    ServerError,
    /// 2xx whose body does not match the expected shape
    BadData,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    ///
    /// Status 0 means no response was received. Anything outside 4xx/5xx that still
    /// reached the error path (1xx, 3xx) is treated as a client error so it is never retried.
    pub fn for_status(status: u16) -> Self {
        match status {
            0 => ErrorKind::NetworkError,
            500..=599 => ErrorKind::ServerError,
            _ => ErrorKind::ClientError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NetworkError => "network error",
            ErrorKind::ClientError => "client error",
            ErrorKind::ServerError => "server error",
            ErrorKind::BadData => "bad data",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a request.
///
/// Created once per failed attempt and never mutated afterwards; all fields are
/// read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} ({status}): {message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: u16,
    message: String,
    cause: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause (transport reason, decode error, ...)
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Network and server failures are expected to succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::NetworkError | ErrorKind::ServerError)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
