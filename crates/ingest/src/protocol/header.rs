//! The fixed quick-header table.
//!
//! A small, closed set of hot header names is indexed while the header block is scanned
//! once, giving O(1) access to their values afterwards. Every other header stays reachable
//! through the generic lookup in [`codec::header`](crate::codec::header).

use crate::protocol::View;

/// Number of quick-header slots, including the reserved ones
pub const QUICK_HEADER_COUNT: usize = 8;

/// Headers that get a dedicated slot in [`QuickHeaders`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QuickHeader {
    Host,
    AcceptEncoding,
    LastModified,
    IfModifiedSince,
    Range,
    ContentLength,
}

impl QuickHeader {
    /// The quick-header name table, in slot order
    pub const ALL: [QuickHeader; 6] = [
        QuickHeader::Host,
        QuickHeader::AcceptEncoding,
        QuickHeader::LastModified,
        QuickHeader::IfModifiedSince,
        QuickHeader::Range,
        QuickHeader::ContentLength,
    ];

    /// Canonical header name
    pub const fn name(self) -> &'static str {
        match self {
            QuickHeader::Host => "Host",
            QuickHeader::AcceptEncoding => "Accept-Encoding",
            QuickHeader::LastModified => "Last-Modified",
            QuickHeader::IfModifiedSince => "If-Modified-Since",
            QuickHeader::Range => "Range",
            QuickHeader::ContentLength => "Content-Length",
        }
    }

    /// Slot index of this header in [`QuickHeaders`]
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Matches a raw header key against the table, ignoring ASCII case.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        let first = name.first()?.to_ascii_uppercase();
        Self::ALL.into_iter().find(|header| {
            let candidate = header.name().as_bytes();
            candidate[0] == first && candidate.len() == name.len() && candidate.eq_ignore_ascii_case(name)
        })
    }
}

/// Values of the quick headers found in one request's header block.
///
/// Each slot is either unset or a [`View`] of the header value. A slot is populated at most
/// once per parse: when a header appears twice, the first occurrence wins.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct QuickHeaders {
    slots: [Option<View>; QUICK_HEADER_COUNT],
}

impl QuickHeaders {
    #[inline]
    pub fn get(&self, header: QuickHeader) -> Option<View> {
        self.slots[header.slot()]
    }

    /// Raw slot access, including the reserved slots
    pub fn slot(&self, index: usize) -> Option<View> {
        self.slots.get(index).copied().flatten()
    }

    /// Records `value` unless the slot already holds one; returns whether it was recorded.
    pub(crate) fn set_if_absent(&mut self, header: QuickHeader, value: View) -> bool {
        let slot = &mut self.slots[header.slot()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Iterates the populated slots in table order.
    pub fn iter(&self) -> impl Iterator<Item = (QuickHeader, View)> + '_ {
        QuickHeader::ALL.into_iter().filter_map(|header| self.get(header).map(|view| (header, view)))
    }
}

/// The indexed header block of one request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    pub(crate) block: View,
    pub(crate) quick: QuickHeaders,
    pub(crate) conflicting_length: bool,
    pub(crate) transfer_encoding: bool,
}

impl HeaderIndex {
    /// The header block, from the first header line up to (excluding) the blank line
    #[inline]
    pub fn block(&self) -> View {
        self.block
    }

    #[inline]
    pub fn quick(&self) -> &QuickHeaders {
        &self.quick
    }

    /// True if `Content-Length` was declared more than once with different values
    #[inline]
    pub fn has_conflicting_length(&self) -> bool {
        self.conflicting_length
    }

    /// True if a `Transfer-Encoding` header is present
    #[inline]
    pub fn has_transfer_encoding(&self) -> bool {
        self.transfer_encoding
    }
}
