//! Byte-at-a-time tokenizer for HTTP/1.x request heads.
//!
//! The tokenizer only locates fields: method, URI, query string, protocol, header keys and
//! header values. It takes no decisions based on their content. Its whole state lives in a
//! caller-owned [`Cursor`], so a connection can keep the cursor between reads and resume
//! scanning once its buffer has grown, without revisiting bytes already seen.
//!
//! # Request levels
//!
//! 1. First line: `METHOD SP URI[?QUERY] SP PROTOCOL CRLF`
//! 2. Headers (optional): `KEY: VALUE CRLF`, repeated, then a blank `CRLF`
//!
//! # Example
//!
//! ```
//! use micro_ingest::codec::{tokenize_with, Cursor, Scan, TokenKind};
//!
//! let buf = b"GET /index.html?lang=en HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let mut cursor = Cursor::new();
//! let mut query = None;
//! let scan = tokenize_with(&mut cursor, buf, |token| {
//!     if token.kind == TokenKind::Query {
//!         query = Some(token.view.slice(buf));
//!     }
//! });
//!
//! assert_eq!(scan.unwrap(), Scan::Complete);
//! assert_eq!(query, Some(&b"lang=en"[..]));
//! ```

use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, View};
use State::*;

/// A method delimited by a space must be at least this long
const MIN_METHOD_LEN: usize = 2;

/// An unterminated method longer than this is rejected instead of waiting for more bytes
const MAX_METHOD_LEN: usize = 10;

/// Part of the request being scanned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    FirstLine,
    Headers,
}

/// Position of the tokenizer inside its current level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    /// Read the method up to the first space
    Method,
    /// Read the URI up to a space or `?`
    Uri,
    /// Read the query string up to a space
    QueryString,
    /// Read the protocol version up to CR
    Protocol,
    /// Read LF after the request line
    Lf,
    /// Peek for a CR announcing an empty header block
    FirstContinue,
    /// Read LF of the blank line right after the request line
    FirstFinalize,
    /// Read a header key up to `:`
    HeaderKey,
    /// Skip spaces in front of a header value
    HeaderValue,
    /// Read a header value up to CR
    HeaderValueBody,
    /// Read LF after a header value
    HeaderEnd,
    /// Read LF of the blank line closing the header block
    BlockEnd,
    /// The request head is complete
    Done,
}

/// Resumable tokenizer state.
///
/// `start` and `end` delimit the field being scanned; `position` is the next byte to look
/// at. All offsets are absolute positions in the buffer passed to [`tokenize`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cursor {
    level: Level,
    state: State,
    start: usize,
    end: usize,
    pos: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    pub const fn new() -> Self {
        Self { level: Level::FirstLine, state: Method, start: 0, end: 0, pos: 0 }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Offset of the next byte to scan; once the head is complete, the length of the head
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Start of the field currently being scanned
    #[inline]
    pub fn field_start(&self) -> usize {
        self.start
    }

    /// End of the last delimited field
    #[inline]
    pub fn field_end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == Done
    }

    #[inline]
    fn goto(&mut self, level: Level, state: State) {
        self.level = level;
        self.state = state;
    }
}

/// Kind of a located field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Method,
    /// The URI without its query string
    Uri,
    Query,
    Protocol,
    HeaderKey,
    /// A header value without leading spaces; trailing spaces are kept
    HeaderValue,
}

/// A located field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub view: View,
}

/// Result of a tokenizer run that did not hit malformed input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scan {
    /// The blank line closing the head was reached
    Complete,
    /// The buffer ended inside the head; call again with more bytes
    Partial,
}

/// Scans `buf` from the cursor position, see [`tokenize_with`].
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] when the head violates the request syntax.
pub fn tokenize(cursor: &mut Cursor, buf: &[u8]) -> Result<Scan, ParseError> {
    tokenize_with(cursor, buf, |_| {})
}

/// Scans `buf` from the cursor position, reporting every located field to `on_token`.
///
/// Fields reported before a [`Scan::Partial`] are not reported again when the scan is
/// resumed with the same cursor.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if:
/// - the method is shorter than 2 bytes, or still unterminated and not 1 to 10 bytes long
///   when the buffer ends
/// - the URI is empty
/// - the request line or the blank line after it is not terminated by CRLF
/// - a header key is empty or a header line has no `:`
/// - a header value is empty
pub fn tokenize_with<F>(cursor: &mut Cursor, buf: &[u8], mut on_token: F) -> Result<Scan, ParseError>
where
    F: FnMut(Token),
{
    let mut emit = |kind: TokenKind, start: usize, end: usize| {
        let view = View::between(start, end);
        trace!(kind = ?kind, offset = view.offset(), len = view.len(), "located field");
        on_token(Token { kind, view });
    };

    while cursor.pos < buf.len() {
        let i = cursor.pos;
        let byte = buf[i];

        match cursor.state {
            Method => {
                if byte == b' ' {
                    ensure!(i - cursor.start >= MIN_METHOD_LEN, ParseError::malformed(i, "method too short"));
                    cursor.end = i;
                    emit(TokenKind::Method, cursor.start, i);
                    cursor.state = Uri;
                    cursor.start = i + 1;
                }
            }
            Uri => match byte {
                b' ' => {
                    ensure!(i > cursor.start, ParseError::malformed(i, "empty uri"));
                    cursor.end = i;
                    emit(TokenKind::Uri, cursor.start, i);
                    cursor.state = Protocol;
                    cursor.start = i + 1;
                }
                b'?' => {
                    // the uri ends here but is reported together with the query
                    cursor.end = i;
                    cursor.state = QueryString;
                }
                _ => {}
            },
            QueryString => {
                if byte == b' ' {
                    emit(TokenKind::Uri, cursor.start, cursor.end);
                    emit(TokenKind::Query, cursor.end + 1, i);
                    cursor.end = i;
                    cursor.state = Protocol;
                    cursor.start = i + 1;
                }
            }
            Protocol => match byte {
                b'\r' => {
                    cursor.end = i;
                    emit(TokenKind::Protocol, cursor.start, i);
                    cursor.state = Lf;
                }
                b'\n' => return Err(ParseError::malformed(i, "bare LF in request line")),
                _ => {}
            },
            Lf => {
                ensure!(byte == b'\n', ParseError::malformed(i, "request line not terminated by CRLF"));
                cursor.state = FirstContinue;
            }
            FirstContinue => {
                if byte == b'\r' {
                    cursor.state = FirstFinalize;
                } else {
                    // first byte of the first header key, scan it again as such
                    cursor.goto(Level::Headers, HeaderKey);
                    cursor.start = i;
                    continue;
                }
            }
            FirstFinalize => {
                ensure!(byte == b'\n', ParseError::malformed(i, "blank line not terminated by CRLF"));
                cursor.goto(Level::Headers, Done);
                cursor.pos = i + 1;
                return Ok(Scan::Complete);
            }
            HeaderKey => match byte {
                b':' => {
                    ensure!(i > cursor.start, ParseError::malformed(i, "empty header name"));
                    cursor.end = i;
                    emit(TokenKind::HeaderKey, cursor.start, i);
                    cursor.state = HeaderValue;
                    cursor.start = i + 1;
                }
                b'\r' if i == cursor.start => cursor.state = BlockEnd,
                b'\r' | b'\n' => return Err(ParseError::malformed(i, "header line without ':'")),
                _ => {}
            },
            HeaderValue => {
                if byte != b' ' {
                    cursor.state = HeaderValueBody;
                    cursor.start = i;
                    continue;
                }
            }
            HeaderValueBody => {
                if byte == b'\r' {
                    ensure!(i > cursor.start, ParseError::malformed(i, "empty header value"));
                    cursor.end = i;
                    emit(TokenKind::HeaderValue, cursor.start, i);
                    cursor.state = HeaderEnd;
                }
            }
            HeaderEnd => {
                ensure!(byte == b'\n', ParseError::malformed(i, "header line not terminated by CRLF"));
                cursor.state = HeaderKey;
                cursor.start = i + 1;
            }
            BlockEnd => {
                ensure!(byte == b'\n', ParseError::malformed(i, "header block not terminated by CRLF"));
                cursor.state = Done;
                cursor.pos = i + 1;
                return Ok(Scan::Complete);
            }
            Done => return Ok(Scan::Complete),
        }

        cursor.pos += 1;
    }

    if cursor.state == Done {
        return Ok(Scan::Complete);
    }

    if cursor.level == Level::FirstLine && cursor.state == Method {
        let len = buf.len() - cursor.start;
        ensure!((1..=MAX_METHOD_LEN).contains(&len), ParseError::malformed(buf.len(), "invalid method length"));
    }

    Ok(Scan::Partial)
}
