//! Request framing for byte streams.
//!
//! This module adapts [`RequestParser`] to [`tokio_util::codec::Decoder`], so that a
//! connection can be read through a [`FramedRead`](tokio_util::codec::FramedRead) and
//! yield batches of pipelined requests.
//!
//! # Components
//!
//! - [`RequestDecoder`]: splits parsed requests off the read buffer
//! - [`RequestBatch`]: the frozen bytes of one or more requests with their chain
//! - [`RequestRef`]: one request of a batch with typed accessors
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_ingest::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /a HTTP/1.1\r\nHost: example.com\r\n\r\nGET /b"[..]);
//!
//! let batch = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.get(0).unwrap().path(), b"/a");
//!
//! // the partial request stays in the buffer
//! assert_eq!(&buffer[..], b"GET /b");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//! ```

use bytes::{Bytes, BytesMut};
use http::{Method, StatusCode, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestParser;
use crate::ensure;
use crate::protocol::{ParseError, QuickHeader, RequestChain, RequestRecord, RequestState, Status, View};

/// A decoder yielding the requests found in a connection's read buffer.
///
/// Every call hands the buffer to the [`RequestParser`]:
/// - complete requests are split off the buffer and yielded as one [`RequestBatch`]
/// - a trailing partial request stays in the buffer until more bytes arrive
/// - an aborted parse yields the whole buffer, the last record carrying the error status
///
/// A partial request that grows beyond `max_header_bytes + max_request_size` fails with
/// [`ParseError::TooLargeHeader`].
#[derive(Debug, Default)]
pub struct RequestDecoder {
    parser: RequestParser,
}

impl RequestDecoder {
    /// Creates a decoder with a default [`RequestParser`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: RequestParser) -> Self {
        Self { parser }
    }

    fn pending_limit(&self) -> usize {
        let config = self.parser.config();
        config.max_header_bytes().saturating_add(config.max_request_size())
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestBatch;
    type Error = ParseError;

    /// Parses the buffered bytes.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(batch))`: at least one request was split off the buffer
    /// - `Ok(None)`: the buffer holds no complete request yet
    /// - `Err(_)`: the pending request is too large, or the chain could not grow
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        // every batch owns its chain, so a fresh one is parsed into on each call
        let chain = self.parser.parse(src)?;
        let status = chain.status();

        if status.is_partial() && chain.is_empty() {
            let limit = self.pending_limit();
            ensure!(src.len() <= limit, ParseError::too_large_header(src.len(), limit));
            return Ok(None);
        }

        let consumed = chain.consumed();
        let buf = src.split_to(consumed).freeze();

        trace!(requests = chain.len(), consumed, status = ?status, "decoded request batch");
        Ok(Some(RequestBatch { buf, chain }))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(batch) => Ok(Some(batch)),
            None if buf.is_empty() => Ok(None),
            None => Err(ParseError::malformed(buf.len(), "connection closed inside a request")),
        }
    }
}

/// Requests split off a connection buffer, together with the bytes they refer to.
#[derive(Debug, Clone)]
pub struct RequestBatch {
    buf: Bytes,
    chain: RequestChain,
}

impl RequestBatch {
    /// The raw bytes of every request in the batch
    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.buf
    }

    #[inline]
    pub fn chain(&self) -> &RequestChain {
        &self.chain
    }

    /// Status of the parse that produced this batch; never [`Status::Partial`] without
    /// requests
    #[inline]
    pub fn status(&self) -> Status {
        self.chain.status()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// True if the connection must be closed after answering this batch
    pub fn is_aborted(&self) -> bool {
        self.chain.status().is_aborted()
    }

    pub fn get(&self, index: usize) -> Option<RequestRef<'_>> {
        self.chain.get(index).map(|record| RequestRef { buf: &self.buf, record })
    }

    pub fn iter(&self) -> impl Iterator<Item = RequestRef<'_>> {
        self.chain.iter().map(|record| RequestRef { buf: &self.buf, record })
    }
}

/// One request of a [`RequestBatch`].
#[derive(Debug, Copy, Clone)]
pub struct RequestRef<'a> {
    buf: &'a Bytes,
    record: &'a RequestRecord,
}

impl<'a> RequestRef<'a> {
    #[inline]
    pub fn record(&self) -> &'a RequestRecord {
        self.record
    }

    pub fn state(&self) -> RequestState {
        self.record.state()
    }

    /// The error status decided during ingestion, `None` for an accepted request
    pub fn status(&self) -> Option<StatusCode> {
        self.record.status()
    }

    pub fn is_rejected(&self) -> bool {
        self.record.is_rejected()
    }

    /// The method; extension methods are kept as they are on the wire.
    ///
    /// `None` for the placeholder record of an aborted parse, which has no method.
    pub fn method(&self) -> Option<Method> {
        self.record.http_method(self.buf)
    }

    pub fn raw_method(&self) -> &'a [u8] {
        self.record.method(self.buf)
    }

    pub fn version(&self) -> Option<Version> {
        self.record.version(self.buf)
    }

    pub fn uri(&self) -> &'a [u8] {
        self.record.uri(self.buf)
    }

    pub fn path(&self) -> &'a [u8] {
        self.record.decoded_path(self.buf)
    }

    pub fn query(&self) -> &'a [u8] {
        self.record.query(self.buf)
    }

    pub fn header(&self, name: &str) -> Option<&'a [u8]> {
        self.record.header(self.buf, name)
    }

    pub fn quick(&self, header: QuickHeader) -> Option<&'a [u8]> {
        self.record.quick(header).map(|view| view.slice(self.buf))
    }

    /// The request body, sharing the batch's memory
    pub fn body(&self) -> Bytes {
        self.slice(self.record.body())
    }

    /// The header block, sharing the batch's memory
    pub fn raw_headers(&self) -> Bytes {
        self.slice(self.record.headers())
    }

    fn slice(&self, view: View) -> Bytes {
        self.buf.slice(view.offset()..view.end())
    }
}
