//! Header block indexing and lookup.
//!
//! [`index_headers`] walks a header block line by line once, filling the quick-header
//! slots and fixing the real end of the block. [`lookup`] answers any header name
//! afterwards: quick headers straight from their slot, everything else by rescanning the
//! block.
//!
//! Header values are trimmed the same way on both paths: leading spaces and colons are
//! skipped, a trailing CR is dropped, trailing spaces are kept.

use tracing::trace;

use crate::protocol::{HeaderIndex, QuickHeader, View};
use crate::utils::find_byte;

const TRANSFER_ENCODING: &[u8] = b"Transfer-Encoding";

/// Indexes the header lines of `block`.
///
/// The block ends at the first line that has no `:` before its LF, or no LF at all; the
/// returned index's [`block`](HeaderIndex::block) is truncated there. For a well-formed
/// request this is the start of the blank line closing the head.
///
/// The first occurrence of a quick header wins. A repeated `Content-Length` with a
/// different value marks the index as conflicting, and any `Transfer-Encoding` header is
/// flagged.
pub fn index_headers(buf: &[u8], block: View) -> HeaderIndex {
    let mut index = HeaderIndex { block, ..HeaderIndex::default() };
    let end = block.end();
    let mut line_start = block.offset();

    while let Some(lf) = find_byte(b'\n', buf, line_start, end) {
        let Some(colon) = find_byte(b':', buf, line_start, lf) else {
            break;
        };

        let key = &buf[line_start..colon];
        let value = trim_value(buf, colon, lf);

        if let Some(header) = QuickHeader::from_name(key) {
            if header == QuickHeader::ContentLength
                && index.quick.get(header).is_some_and(|first| first.slice(buf) != value.slice(buf))
            {
                index.conflicting_length = true;
            }
            if index.quick.set_if_absent(header, value) {
                trace!(header = header.name(), offset = value.offset(), len = value.len(), "quick header set");
            }
        } else if key.eq_ignore_ascii_case(TRANSFER_ENCODING) {
            index.transfer_encoding = true;
        }

        line_start = lf + 1;
    }

    index.block = block.truncate(line_start - block.offset());
    index
}

/// Looks up the value of header `name` in an indexed block.
///
/// Quick headers are answered from their slot without scanning; an unset slot means the
/// header is absent. Other names are matched ignoring ASCII case against every line of the
/// block, and the first match wins.
pub fn lookup(index: &HeaderIndex, buf: &[u8], name: &[u8]) -> Option<View> {
    if let Some(header) = QuickHeader::from_name(name) {
        return index.quick().get(header);
    }

    let block = index.block();
    let mut line_start = block.offset();

    while line_start < block.end() {
        let lf = find_byte(b'\n', buf, line_start, block.end()).unwrap_or(block.end());

        if let Some(colon) = find_byte(b':', buf, line_start, lf)
            && buf[line_start..colon].eq_ignore_ascii_case(name)
        {
            return Some(trim_value(buf, colon, lf));
        }

        line_start = lf + 1;
    }

    None
}

/// Parses a `Content-Length` value: optional surrounding whitespace around ASCII digits.
pub(crate) fn content_length(value: &[u8]) -> Option<u64> {
    let digits = value.trim_ascii();
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, digit| acc.checked_mul(10)?.checked_add(u64::from(digit - b'0')))
}

/// The value of the header line whose `:` is at `colon` and whose line ends at `lf`.
fn trim_value(buf: &[u8], colon: usize, lf: usize) -> View {
    let mut start = colon;
    while start < lf && matches!(buf[start], b' ' | b':') {
        start += 1;
    }

    let end = if lf > start && buf[lf - 1] == b'\r' { lf - 1 } else { lf };
    View::between(start, end)
}
