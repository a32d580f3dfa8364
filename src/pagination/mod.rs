//! Pagination module
//!
//! Follows RFC 8288 `Link` headers (`rel="next"`) until the server stops
//! sending one.
//!
//! # Overview
//!
//! - `PageLinks` - the `first`/`last`/`next`/`prev` relations of one response
//! - `PagedResult` - lazy, restartable walk over every page of a listing
//! - `fetch_all` - collect every page into one `Vec`

mod link;
mod pager;

pub use link::PageLinks;
pub use pager::{fetch_all, PagedResult};

#[cfg(test)]
mod tests;
