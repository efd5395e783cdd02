//! Core types of the ingestion core.
//!
//! Everything the parser produces is a view into the caller's buffer; the types in this
//! module describe those views and the records built from them.
//!
//! # Components
//!
//! - **Views** ([`view`]): [`View`], a non-owning `(offset, len)` pair
//! - **Quick headers** ([`header`]): the fixed [`QuickHeader`] table and the per-request
//!   [`HeaderIndex`]
//! - **Requests** ([`request`]): [`RequestRecord`], [`RequestLine`], [`RequestState`] and the
//!   [`HostResolver`] seam
//! - **Chains** ([`chain`]): [`RequestChain`] and the parse [`Status`]
//! - **Errors** ([`error`]): [`ParseError`] for structural failures, [`Rejection`] for the
//!   sanity check

mod view;
pub use view::View;

mod header;
pub use header::HeaderIndex;
pub use header::QUICK_HEADER_COUNT;
pub use header::QuickHeader;
pub use header::QuickHeaders;

mod request;
pub use request::HostResolver;
pub use request::RequestLine;
pub use request::RequestRecord;
pub use request::RequestState;
pub use request::VirtualHost;

mod chain;
pub use chain::RequestChain;
pub use chain::Status;

mod error;
pub use error::ParseError;
pub use error::Rejection;
pub use error::RejectionKind;
