//! Request line extraction.
//!
//! Locates the method, URI and protocol of a request line with a handful of byte searches,
//! without running the full [tokenizer](crate::codec::tokenizer).

use tracing::trace;

use crate::codec::header;
use crate::ensure;
use crate::protocol::{HeaderIndex, ParseError, RequestLine, View};
use crate::utils::find_byte;

/// A header block made of the blank line alone
const BLANK_LINE: &[u8] = b"\r\n";

/// Splits the request line starting at `start` into its fields.
///
/// Returns the line together with the provisional header block: everything after the
/// request line up to the end of `buf`. [`header::index_headers`] narrows it down.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if the line has no LF, if the method or the URI is
/// not followed by a space on the same line, or if the URI does not start with `/`.
pub fn extract(buf: &[u8], start: usize) -> Result<(RequestLine, View), ParseError> {
    let lf = find_byte(b'\n', buf, start, buf.len()).ok_or_else(|| ParseError::malformed(buf.len(), "request line is not terminated"))?;

    let method_end = find_byte(b' ', buf, start, lf).ok_or_else(|| ParseError::malformed(lf, "no space after method"))?;

    let uri_start = method_end + 1;
    ensure!(buf[uri_start] == b'/', ParseError::malformed(uri_start, "uri must start with '/'"));

    let uri_end = find_byte(b' ', buf, uri_start, lf).ok_or_else(|| ParseError::malformed(lf, "no space after uri"))?;

    let protocol_start = uri_end + 1;
    let protocol_end = if lf > protocol_start && buf[lf - 1] == b'\r' { lf - 1 } else { lf };

    let uri = View::between(uri_start, uri_end);
    let (path, query) = match find_byte(b'?', buf, uri_start, uri_end) {
        Some(question) => (View::between(uri_start, question), View::between(question + 1, uri_end)),
        None => (uri, View::new(uri_end, 0)),
    };

    let line = RequestLine {
        method: View::between(start, method_end),
        uri,
        protocol: View::between(protocol_start, protocol_end),
        path,
        query,
    };
    let headers = View::between(lf + 1, buf.len());

    trace!(method = ?line.method, uri = ?line.uri, protocol = ?line.protocol, "request line extracted");
    Ok((line, headers))
}

/// Extracts the request line at `start` and indexes the header block after it.
///
/// # Errors
///
/// See [`extract`].
pub fn parse_head(buf: &[u8], start: usize) -> Result<(RequestLine, HeaderIndex), ParseError> {
    let (line, headers) = extract(buf, start)?;

    let index = if headers.len() == BLANK_LINE.len() {
        HeaderIndex { block: headers.truncate(0), ..HeaderIndex::default() }
    } else {
        header::index_headers(buf, headers)
    };

    Ok((line, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::QuickHeader;

    fn assert_malformed(buf: &[u8]) {
        let result = extract(buf, 0);
        assert!(matches!(result, Err(ParseError::Malformed { .. })), "{:?} => {result:?}", String::from_utf8_lossy(buf));
    }

    #[test]
    fn simple_line() {
        let buf = b"GET /index.html HTTP/1.1\r\nHost: a\r\n\r\n";
        let (line, headers) = extract(buf, 0).unwrap();

        assert_eq!(line.method().slice(buf), b"GET");
        assert_eq!(line.uri().slice(buf), b"/index.html");
        assert_eq!(line.path().slice(buf), b"/index.html");
        assert!(line.query().is_empty());
        assert_eq!(line.query().offset(), line.uri().end());
        assert_eq!(line.protocol().slice(buf), b"HTTP/1.1");
        assert_eq!(headers.slice(buf), b"Host: a\r\n\r\n");
    }

    #[test]
    fn query_string() {
        let buf = b"GET /search?q=a?b HTTP/1.0\r\n\r\n";
        let (line, _) = extract(buf, 0).unwrap();

        assert_eq!(line.uri().slice(buf), b"/search?q=a?b");
        assert_eq!(line.path().slice(buf), b"/search");
        assert_eq!(line.query().slice(buf), b"q=a?b");
    }

    #[test]
    fn starts_at_offset() {
        let buf = b"GET / HTTP/1.1\r\n\r\nHEAD /b HTTP/1.0\n\r\n";
        let (line, headers) = extract(buf, 18).unwrap();

        assert_eq!(line.method().slice(buf), b"HEAD");
        assert_eq!(line.uri().slice(buf), b"/b");
        assert_eq!(line.protocol().slice(buf), b"HTTP/1.0");
        assert_eq!(headers.slice(buf), b"\r\n");
    }

    #[test]
    fn malformed_lines() {
        assert_malformed(b"GET /HTTP/1.0\r\n\r\n");
        assert_malformed(b"GET/ HTTP/1.0\r\n\r\n");
        assert_malformed(b"GET index.html HTTP/1.0\r\n\r\n");
        assert_malformed(b"GET  HTTP/1.0\r\n\r\n");
        assert_malformed(b"GET\r\nHost: a b\r\n\r\n");
        assert_malformed(b"GET / HTTP/1.1");
    }

    #[test]
    fn blank_header_block_is_not_indexed() {
        let buf = b"GET / HTTP/1.1\r\n\r\n";
        let (_, index) = parse_head(buf, 0).unwrap();
        assert!(index.block().is_empty());
        assert_eq!(index.block().offset(), 16);
        assert_eq!(index.quick().iter().count(), 0);
    }

    #[test]
    fn head_with_headers() {
        let buf = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let (_, index) = parse_head(buf, 0).unwrap();
        assert_eq!(index.quick().get(QuickHeader::Host).map(|view| view.slice(buf)), Some(&b"example.com"[..]));
        assert_eq!(index.block().slice(buf), b"Host: example.com\r\n");
    }
}
