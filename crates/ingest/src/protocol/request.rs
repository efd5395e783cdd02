//! Parsed request records.
//!
//! A [`RequestRecord`] is the structural result of parsing one request out of a connection
//! buffer. It holds no bytes of its own: every field is a [`View`] into the buffer the
//! record was parsed from, so a record must never outlive that buffer.

use std::fmt;
use std::sync::{Arc, Weak};

use http::{Method, StatusCode, Version};

use crate::codec::header;
use crate::protocol::{HeaderIndex, QuickHeader, View};

/// Coarse processing phase of a request.
///
/// This is a routing marker for the stages after ingestion, not a checked state machine.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Unused,
    /// Parsed and appended to a chain, not validated yet (or rejected by validation)
    New,
    /// Validated, ready for response header generation
    HeaderPhase,
    BodyPhase,
    FilterPhase,
    Done,
}

/// Spans of the request line.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub(crate) method: View,
    pub(crate) uri: View,
    pub(crate) protocol: View,
    pub(crate) path: View,
    pub(crate) query: View,
}

impl RequestLine {
    #[inline]
    pub fn method(&self) -> View {
        self.method
    }

    /// The full request target, including the query string
    #[inline]
    pub fn uri(&self) -> View {
        self.uri
    }

    #[inline]
    pub fn protocol(&self) -> View {
        self.protocol
    }

    /// The URI up to (excluding) the first `?`
    #[inline]
    pub fn path(&self) -> View {
        self.path
    }

    /// The text after the first `?`, empty when the URI has no query
    #[inline]
    pub fn query(&self) -> View {
        self.query
    }
}

/// A virtual host entry owned by the host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHost {
    name: String,
}

impl VirtualHost {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolves the `Host` header of a request to a virtual host entry.
///
/// The parser only locates the header; deciding which host serves the request is left to
/// the implementor. The resolver receives the host name with any `:port` suffix removed.
pub trait HostResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, host: &[u8]) -> Option<Arc<VirtualHost>>;
}

/// One request found in a connection buffer.
#[derive(Debug, Clone, Default)]
pub struct RequestRecord {
    pub(crate) state: RequestState,
    pub(crate) line: RequestLine,
    pub(crate) headers: HeaderIndex,
    pub(crate) body: View,
    pub(crate) vhost: Option<Weak<VirtualHost>>,
    pub(crate) status: Option<StatusCode>,
}

impl RequestRecord {
    pub(crate) fn new(line: RequestLine, headers: HeaderIndex) -> Self {
        Self { state: RequestState::New, line, headers, body: View::EMPTY, vhost: None, status: None }
    }

    /// A record standing for a request that could not be parsed.
    pub(crate) fn aborted(status: StatusCode) -> Self {
        Self { state: RequestState::Done, status: Some(status), ..Self::default() }
    }

    #[inline]
    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn set_state(&mut self, state: RequestState) {
        self.state = state;
    }

    #[inline]
    pub fn line(&self) -> &RequestLine {
        &self.line
    }

    /// The header block view
    #[inline]
    pub fn headers(&self) -> View {
        self.headers.block()
    }

    #[inline]
    pub fn header_index(&self) -> &HeaderIndex {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> View {
        self.body
    }

    /// Returns the value view of a quick header, if present.
    #[inline]
    pub fn quick(&self, header: QuickHeader) -> Option<View> {
        self.headers.quick().get(header)
    }

    /// Looks up any header by name, see [`header::lookup`].
    pub fn header<'b>(&self, buf: &'b [u8], name: &str) -> Option<&'b [u8]> {
        header::lookup(&self.headers, buf, name.as_bytes()).map(|view| view.slice(buf))
    }

    /// The response status decided during ingestion, `None` if the request was accepted
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// True if ingestion already decided on an error response for this request
    pub fn is_rejected(&self) -> bool {
        self.status.is_some_and(|status| status.is_client_error() || status.is_server_error())
    }

    /// The virtual host the request was resolved to, if it is still configured
    pub fn vhost(&self) -> Option<Arc<VirtualHost>> {
        self.vhost.as_ref().and_then(Weak::upgrade)
    }

    pub fn method<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.line.method.slice(buf)
    }

    /// The method as an [`http::Method`], `None` if it is not a valid token
    pub fn http_method(&self, buf: &[u8]) -> Option<Method> {
        Method::from_bytes(self.method(buf)).ok()
    }

    pub fn uri<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.line.uri.slice(buf)
    }

    /// The request path.
    ///
    /// No percent-decoding is performed: the returned bytes are exactly the bytes on the
    /// wire, and the traversal check in validation runs on them as they are.
    pub fn decoded_path<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.line.path.slice(buf)
    }

    pub fn query<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.line.query.slice(buf)
    }

    pub fn protocol<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.line.protocol.slice(buf)
    }

    /// The protocol as an [`http::Version`], `None` for anything but HTTP/0.9, 1.0 and 1.1
    pub fn version(&self, buf: &[u8]) -> Option<Version> {
        match self.protocol(buf) {
            b"HTTP/1.1" => Some(Version::HTTP_11),
            b"HTTP/1.0" => Some(Version::HTTP_10),
            b"HTTP/0.9" => Some(Version::HTTP_09),
            _ => None,
        }
    }

    pub fn body_bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.body.slice(buf)
    }
}

/// Records compare by their parsed fields; virtual hosts compare by identity.
impl PartialEq for RequestRecord {
    fn eq(&self, other: &Self) -> bool {
        let same_vhost = match (&self.vhost, &other.vhost) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.state == other.state
            && self.line == other.line
            && self.headers == other.headers
            && self.body == other.body
            && self.status == other.status
            && same_vhost
    }
}

impl Eq for RequestRecord {}
