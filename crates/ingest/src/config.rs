//! Parser configuration.
//!
//! The ingestion core has no global state: every limit it enforces comes from a
//! [`ParserConfig`] value handed to the [`RequestParser`](crate::codec::RequestParser).

/// Default maximum size in bytes of a request body declared through `Content-Length`
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 4096;

/// Default maximum number of bytes a request head may occupy while it is still incomplete
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// What to do with bytes found after a body whose `Content-Length` has been satisfied.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ExcessBody {
    /// The excess bytes start the next pipelined request.
    #[default]
    Pipeline,
    /// The excess bytes are treated as part of the body, which then disagrees with the
    /// declared length and the request is aborted with `400 Bad Request`.
    Reject,
}

/// Limits and policies applied while splitting a buffer into requests.
///
/// # Example
///
/// ```
/// use micro_ingest::config::{ExcessBody, ParserConfig};
///
/// let config = ParserConfig::default().with_max_request_size(64 * 1024).with_excess_body(ExcessBody::Reject);
/// assert_eq!(config.max_request_size(), 64 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    max_request_size: usize,
    max_header_bytes: usize,
    excess_body: ExcessBody,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_request_size: DEFAULT_MAX_REQUEST_SIZE, max_header_bytes: DEFAULT_MAX_HEADER_BYTES, excess_body: ExcessBody::Pipeline }
    }
}

impl ParserConfig {
    /// Sets the maximum accepted `Content-Length`, see [`max_request_size`](Self::max_request_size)
    #[must_use]
    pub fn with_max_request_size(mut self, max_request_size: usize) -> Self {
        self.max_request_size = max_request_size;
        self
    }

    /// Sets the size limit of an incomplete request head
    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Sets what happens to bytes following a complete body
    #[must_use]
    pub fn with_excess_body(mut self, excess_body: ExcessBody) -> Self {
        self.excess_body = excess_body;
        self
    }

    /// Maximum accepted `Content-Length` for body-bearing requests
    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    /// Maximum size of an incomplete request head kept in a connection buffer
    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    /// Policy for bytes following a complete body
    pub fn excess_body(&self) -> ExcessBody {
        self.excess_body
    }
}
