//! The ordered chain of requests found in one buffer.

use std::slice;

use http::StatusCode;

use crate::protocol::{ParseError, RequestRecord};

/// Outcome of splitting a buffer into requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// Every byte of the buffer was accounted for. Records may still carry a status code
    /// set by validation, in which case scanning stopped at that record.
    Complete,
    /// The buffer ends inside a request: call again once more bytes arrive. The chain
    /// holds the requests completed before the partial one.
    Partial,
    /// A request could not be parsed. The last record of the chain stands for it and
    /// carries the given status; the connection should be answered and closed.
    Aborted(StatusCode),
}

impl Status {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Complete)
    }

    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self, Status::Partial)
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Status::Aborted(_))
    }
}

/// Requests pipelined in one buffer, in wire order.
///
/// The successor of the record at position `i` is the record at `i + 1`; [`next_of`]
/// offers the linked view of the chain for consumers that walk it that way.
///
/// [`next_of`]: RequestChain::next_of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestChain {
    records: Vec<RequestRecord>,
    consumed: usize,
    status: Status,
}

impl Default for RequestChain {
    fn default() -> Self {
        Self { records: Vec::new(), consumed: 0, status: Status::Partial }
    }
}

impl RequestChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain that can hold `capacity` records without allocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { records: Vec::with_capacity(capacity), ..Self::default() }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of buffer bytes covered by the chain.
    ///
    /// For [`Status::Partial`] this is the offset of the incomplete request; otherwise it
    /// is the length of the whole buffer.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&RequestRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&RequestRecord> {
        self.records.last()
    }

    pub fn get(&self, index: usize) -> Option<&RequestRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RequestRecord> {
        self.records.get_mut(index)
    }

    /// The record following the one at `index`
    pub fn next_of(&self, index: usize) -> Option<&RequestRecord> {
        self.records.get(index.checked_add(1)?)
    }

    pub fn iter(&self) -> slice::Iter<'_, RequestRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, RequestRecord> {
        self.records.iter_mut()
    }

    pub fn into_records(self) -> Vec<RequestRecord> {
        self.records
    }

    /// Drops all records, keeping the allocated storage for the next parse.
    pub(crate) fn reset(&mut self) {
        self.records.clear();
        self.consumed = 0;
        self.status = Status::Partial;
    }

    /// Appends a record, reporting allocation failure instead of aborting the process.
    pub(crate) fn push(&mut self, record: RequestRecord) -> Result<&mut RequestRecord, ParseError> {
        self.records.try_reserve(1)?;
        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&mut self.records[index])
    }

    pub(crate) fn finish(&mut self, status: Status, consumed: usize) -> Status {
        self.status = status;
        self.consumed = consumed;
        status
    }
}

impl<'a> IntoIterator for &'a RequestChain {
    type Item = &'a RequestRecord;
    type IntoIter = slice::Iter<'a, RequestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RequestChain {
    type Item = RequestRecord;
    type IntoIter = std::vec::IntoIter<RequestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
