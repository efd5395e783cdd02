//! A zero-copy HTTP/1.x request ingestion core
//!
//! This crate turns the raw bytes read from a connection into structured request records:
//! it locates the request line, indexes the headers, slices `Content-Length` bodies,
//! splits pipelined requests and runs the semantic checks a server needs before routing a
//! request. Every parsed field is a view into the caller's buffer; no request data is
//! copied.
//!
//! # Features
//!
//! - Resumable tokenizer: a connection keeps its cursor and rescans nothing when more
//!   bytes arrive
//! - O(1) access to a fixed set of hot headers, case-insensitive lookup for the rest
//! - HTTP pipelining: many requests per buffer, in wire order
//! - Validation: path traversal, `Host` ports, body framing and size limits
//! - A [`tokio_util::codec::Decoder`] to read requests from any `AsyncRead`
//!
//! # Example
//!
//! ```
//! use micro_ingest::codec::RequestParser;
//! use micro_ingest::config::ParserConfig;
//! use micro_ingest::protocol::Status;
//!
//! let buf = b"POST /form HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhelloGET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let parser = RequestParser::with_config(ParserConfig::default().with_max_request_size(1024));
//! let chain = parser.parse(buf).unwrap();
//!
//! assert_eq!(chain.status(), Status::Complete);
//! assert_eq!(chain.len(), 2);
//!
//! let post = chain.first().unwrap();
//! assert_eq!(post.method(buf), b"POST");
//! assert_eq!(post.body_bytes(buf), b"hello");
//! assert_eq!(post.header(buf, "host"), Some(&b"example.com"[..]));
//! assert!(chain.iter().all(|request| request.status().is_none()));
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`codec`]: Tokenizer, header index, validation, pipeline splitter and decoder
//! - [`protocol`]: Views, request records, chains and error types
//! - [`config`]: Parser limits and policies

pub mod codec;
pub mod config;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
