use std::collections::TryReserveError;
use std::io;

use http::StatusCode;
use thiserror::Error;

/// Errors raised while locating the structure of a request.
///
/// Needing more bytes is not an error: it is reported as
/// [`Scan::Partial`](crate::codec::Scan) or [`Status::Partial`](crate::protocol::Status).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("request body size too large, declared: {declared} exceed the limit {max_size}")]
    TooLargeBody { declared: u64, max_size: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("can't allocate request record: {source}")]
    AllocationFailure {
        #[from]
        source: TryReserveError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::Malformed { offset, reason }
    }

    pub fn too_large_body(declared: u64, max_size: usize) -> Self {
        Self::TooLargeBody { declared, max_size }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    /// The status code of the error response for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            ParseError::Malformed { .. } | ParseError::Io { .. } => StatusCode::BAD_REQUEST,
            ParseError::TooLargeBody { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ParseError::TooLargeHeader { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            ParseError::AllocationFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True if the whole parse has to be abandoned, not just the current request
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::AllocationFailure { .. } | ParseError::Io { .. })
    }
}

/// Coarse classification of a [`Rejection`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    SecurityViolation,
    Malformed,
    MissingRequiredField,
    ResourceLimitExceeded,
    BodyLengthMismatch,
    Unsupported,
}

/// Reasons for the sanity check to refuse a structurally valid request.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("path contains a parent directory reference")]
    PathTraversal,

    #[error("invalid port in host header: {reason}")]
    InvalidHostPort { reason: &'static str },

    #[error("no host header in HTTP/1.1 request")]
    MissingHost,

    #[error("transfer-encoding is not supported")]
    UnsupportedTransferEncoding,

    #[error("content-length required")]
    LengthRequired,

    #[error("invalid content-length header")]
    InvalidContentLength,

    #[error("content-length declared more than once with different values")]
    ConflictingContentLength,

    #[error("content-length {declared} exceed the limit {max_size}")]
    PayloadTooLarge { declared: u64, max_size: usize },

    #[error("content-length {declared} does not match body size {actual}")]
    BodyLengthMismatch { declared: u64, actual: usize },
}

impl Rejection {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Rejection::PathTraversal => StatusCode::FORBIDDEN,
            Rejection::InvalidHostPort { .. }
            | Rejection::MissingHost
            | Rejection::InvalidContentLength
            | Rejection::ConflictingContentLength
            | Rejection::BodyLengthMismatch { .. } => StatusCode::BAD_REQUEST,
            Rejection::UnsupportedTransferEncoding => StatusCode::NOT_IMPLEMENTED,
            Rejection::LengthRequired => StatusCode::LENGTH_REQUIRED,
            Rejection::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::PathTraversal => RejectionKind::SecurityViolation,
            Rejection::InvalidHostPort { .. } | Rejection::InvalidContentLength | Rejection::ConflictingContentLength => {
                RejectionKind::Malformed
            }
            Rejection::MissingHost | Rejection::LengthRequired => RejectionKind::MissingRequiredField,
            Rejection::PayloadTooLarge { .. } => RejectionKind::ResourceLimitExceeded,
            Rejection::BodyLengthMismatch { .. } => RejectionKind::BodyLengthMismatch,
            Rejection::UnsupportedTransferEncoding => RejectionKind::Unsupported,
        }
    }
}
