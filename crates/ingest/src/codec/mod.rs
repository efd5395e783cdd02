//! Request ingestion: from raw connection bytes to validated request records.
//!
//! # Architecture
//!
//! The codec module is organized into several components, from the lowest level up:
//!
//! - [`tokenizer`]: resumable byte-level state machine locating the fields of a request
//!   head, see [`tokenize`]
//! - Request line: [`extract`] splits the first line of a request
//! - [`header`]: indexes the header block and answers header lookups
//! - Validation: [`validate`] applies the semantic checks to a parsed request
//! - Pipeline: [`RequestParser`] splits a buffer into a [`RequestChain`] of pipelined
//!   requests
//! - Framing: [`RequestDecoder`] drives the parser from a [`tokio_util::codec::Decoder`]
//!
//! # Example
//!
//! ```
//! use micro_ingest::codec::RequestParser;
//! use micro_ingest::protocol::{QuickHeader, Status};
//!
//! let buf = b"GET /index.html HTTP/1.1\r\nHost: example.com:8080\r\n\r\n";
//! let chain = RequestParser::new().parse(buf).unwrap();
//!
//! assert_eq!(chain.status(), Status::Complete);
//! let request = chain.first().unwrap();
//! assert_eq!(request.quick(QuickHeader::Host).unwrap().slice(buf), b"example.com:8080");
//! ```
//!
//! [`RequestChain`]: crate::protocol::RequestChain

pub mod header;
mod pipeline;
mod request_decoder;
mod request_line;
mod sanity;
pub mod tokenizer;

pub use pipeline::RequestParser;
pub use request_decoder::{RequestBatch, RequestDecoder, RequestRef};
pub use request_line::{extract, parse_head};
pub use sanity::validate;
pub use tokenizer::{Cursor, Level, Scan, State, Token, TokenKind, tokenize, tokenize_with};
