//! Non-owning byte ranges into a connection buffer.

/// An `(offset, len)` reference into an externally owned byte buffer.
///
/// A `View` never owns memory and is only meaningful together with the buffer it was
/// produced from. Every `View` the parser hands out satisfies `offset + len <= buf.len()`
/// for that buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct View {
    offset: usize,
    len: usize,
}

impl View {
    /// The empty view at offset 0
    pub const EMPTY: View = View { offset: 0, len: 0 };

    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Creates the view covering `start..end`.
    #[inline]
    pub(crate) const fn between(start: usize, end: usize) -> Self {
        Self { offset: start, len: end - start }
    }

    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// One past the last byte covered by this view
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bytes covered by this view.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not the buffer (or a prefix-preserving extension of the buffer)
    /// this view was produced from and is too short to hold it.
    #[inline]
    pub fn slice<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        &buf[self.offset..self.end()]
    }

    /// Returns the bytes covered by this view, or `None` if `buf` is too short.
    #[inline]
    pub fn get<'b>(&self, buf: &'b [u8]) -> Option<&'b [u8]> {
        buf.get(self.offset..self.end())
    }

    /// Keeps the first `len` bytes of this view.
    #[inline]
    pub(crate) const fn truncate(self, len: usize) -> Self {
        Self { offset: self.offset, len }
    }
}
