//! Header block processing.
//!
//! Headers are never copied or decoded into owned name/value pairs. The block is scanned
//! once into a [`HeaderIndex`](crate::protocol::HeaderIndex) of byte views, and every
//! later question about a header is answered from that index.
//!
//! # Components
//!
//! - [`index_headers`]: builds the index, filling the quick-header slots and locating the
//!   end of the block
//! - [`lookup`]: finds the value of any header, quick or not
//!
//! # Matching rules
//!
//! - Names compare ignoring ASCII case
//! - For repeated headers the first occurrence wins
//! - Values lose leading spaces and the trailing CR, nothing else

mod header_index;

pub use header_index::index_headers;
pub use header_index::lookup;

pub(crate) use header_index::content_length;
