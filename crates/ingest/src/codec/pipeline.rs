//! Splitting a buffer into pipelined requests.
//!
//! [`RequestParser`] walks a connection buffer request by request. Each request goes
//! through the same steps:
//!
//! 1. Wait for the request line to be complete
//! 2. Extract the request line and index the headers
//! 3. Wait for the blank line closing the head, then check the head with the tokenizer;
//!    a head whose path holds `..` skips this check and is refused with 403 in step 5
//! 4. Slice the `Content-Length` body of POST and PUT requests
//! 5. Append the record to the chain and validate it
//!
//! The parser is a pure function of its configuration and the buffer: parsing the same
//! bytes twice yields the same chain.
//!
//! # Example
//!
//! ```
//! use micro_ingest::codec::RequestParser;
//! use micro_ingest::protocol::Status;
//!
//! let buf = b"GET /a HTTP/1.1\r\nHost: example.com\r\n\r\nGET /b HTTP/1.1\r\nHost: exa";
//! let chain = RequestParser::new().parse(buf).unwrap();
//!
//! assert_eq!(chain.status(), Status::Partial);
//! assert_eq!(chain.len(), 1);
//! assert_eq!(chain.first().unwrap().uri(buf), b"/a");
//! assert_eq!(&buf[chain.consumed()..], b"GET /b HTTP/1.1\r\nHost: exa");
//! ```

use std::sync::Arc;

use tracing::{trace, warn};

use crate::codec::header::content_length;
use crate::codec::request_line::parse_head;
use crate::codec::sanity::{has_body, validate};
use crate::codec::tokenizer::{Cursor, Scan, tokenize};
use crate::config::{ExcessBody, ParserConfig};
use crate::protocol::{HostResolver, ParseError, QuickHeader, RequestChain, RequestRecord, Status, View};
use crate::ensure;
use crate::utils::{find_byte, has_dot_dot};

/// Blank line closing a request head, including the CRLF of the last header line
const END_OF_HEAD: &[u8] = b"\r\n\r\n";

/// Splits connection buffers into chains of validated requests.
#[derive(Debug, Clone, Default)]
pub struct RequestParser {
    config: ParserConfig,
    resolver: Option<Arc<dyn HostResolver>>,
}

impl RequestParser {
    /// Creates a parser with the default [`ParserConfig`] and no host resolver.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config, resolver: None }
    }

    /// Resolves the `Host` of every accepted request with `resolver`.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses `buf` into a new chain, see [`parse_into`](Self::parse_into).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AllocationFailure`] if the chain can't grow.
    pub fn parse(&self, buf: &[u8]) -> Result<RequestChain, ParseError> {
        let mut chain = RequestChain::new();
        self.parse_into(buf, &mut chain)?;
        Ok(chain)
    }

    /// Parses `buf` into `chain`, replacing its records but reusing its storage.
    ///
    /// Returns the status also recorded in the chain:
    /// - [`Status::Complete`]: every byte was parsed. If the last record was rejected by
    ///   validation, scanning stopped there and the remaining bytes were dropped.
    /// - [`Status::Partial`]: the buffer ends inside a request starting at
    ///   [`consumed`](RequestChain::consumed); parse again once more bytes arrived.
    /// - [`Status::Aborted`]: a request could not be parsed. The chain ends with a record
    ///   carrying the error status; the connection can't be used any further.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AllocationFailure`] if the chain can't grow. This is the only
    /// failure that does not produce a chain.
    pub fn parse_into(&self, buf: &[u8], chain: &mut RequestChain) -> Result<Status, ParseError> {
        chain.reset();
        let mut offset = 0;

        loop {
            match self.split_next(buf, offset) {
                Ok(Some((record, next))) => {
                    let record = chain.push(record)?;
                    if validate(record, buf, &self.config, self.resolver.as_deref()).is_err() {
                        return Ok(chain.finish(Status::Complete, buf.len()));
                    }

                    offset = next;
                    if offset == buf.len() {
                        trace!(requests = chain.len(), "buffer fully parsed");
                        return Ok(chain.finish(Status::Complete, offset));
                    }
                }
                Ok(None) => {
                    trace!(offset, requests = chain.len(), "partial request, wait for more bytes");
                    return Ok(chain.finish(Status::Partial, offset));
                }
                Err(e) => {
                    let status = e.status_code();
                    warn!(offset, %status, cause = %e, "failed to parse request, abort");
                    chain.push(RequestRecord::aborted(status))?;
                    return Ok(chain.finish(Status::Aborted(status), buf.len()));
                }
            }
        }
    }

    /// Splits the request starting at `start` off the buffer.
    ///
    /// Returns the record and the offset right after it, or `None` if the request is not
    /// complete yet.
    fn split_next(&self, buf: &[u8], start: usize) -> Result<Option<(RequestRecord, usize)>, ParseError> {
        if find_byte(b'\n', buf, start, buf.len()).is_none() {
            return Ok(None);
        }

        let (line, headers) = parse_head(buf, start)?;

        let block_end = headers.block().end();
        let body_start = block_end + 2;
        if body_start > buf.len() || !buf[..body_start].ends_with(END_OF_HEAD) {
            // the line ending the block either is not complete yet or is no header at all
            return match find_byte(b'\n', buf, block_end, buf.len()) {
                Some(lf) => Err(ParseError::malformed(lf, "header line without ':'")),
                None => Ok(None),
            };
        }

        let mut record = RequestRecord::new(line, headers);
        if let Err(e) = check_head(&buf[start..body_start], start) {
            // a traversal is answered with 403 by validation, whatever else is wrong with the head
            ensure!(has_dot_dot(record.decoded_path(buf)), e);
            trace!(cause = %e, "malformed head with path traversal, left to validation");
        }

        let mut next = body_start;

        if has_body(record.method(buf)) {
            let declared = record.quick(QuickHeader::ContentLength).and_then(|value| content_length(value.slice(buf))).unwrap_or(0);
            let max_size = self.config.max_request_size();
            let declared = usize::try_from(declared)
                .ok()
                .filter(|declared| *declared <= max_size)
                .ok_or_else(|| ParseError::too_large_body(declared, max_size))?;

            let available = buf.len() - body_start;
            if declared > available {
                trace!(declared, available, "partial request body");
                return Ok(None);
            }

            match self.config.excess_body() {
                ExcessBody::Pipeline => {
                    record.body = View::new(body_start, declared);
                    next = body_start + declared;
                }
                ExcessBody::Reject => {
                    if declared < available {
                        return Err(ParseError::malformed(body_start + declared, "request body longer than content-length"));
                    }
                    record.body = View::new(body_start, available);
                    next = buf.len();
                }
            }
        }

        Ok(Some((record, next)))
    }
}

/// Runs the tokenizer over a complete request head found at `offset`.
fn check_head(head: &[u8], offset: usize) -> Result<(), ParseError> {
    let mut cursor = Cursor::new();
    match tokenize(&mut cursor, head) {
        Ok(Scan::Complete) if cursor.position() == head.len() => Ok(()),
        Ok(_) => Err(ParseError::malformed(offset + cursor.position(), "request head is not well formed")),
        Err(ParseError::Malformed { offset: at, reason }) => Err(ParseError::malformed(offset + at, reason)),
        Err(e) => Err(e),
    }
}
