//! Connection module
//!
//! A `Connection` is one authenticated session against one server. Backends
//! implement `ConnectionFactory` and compete for each `ConnectionRequest`
//! through a `BackendRegistry`; when none claims it the built-in reqwest
//! backend opens the session.
//!
//! # Resolution
//!
//! 1. A preferred backend on the request is used as-is.
//! 2. Otherwise every registered backend reporting `can_open` is ranked by
//!    `priority`; the highest wins, the earliest registered on a tie.
//! 3. Otherwise the fallback (default HTTP) backend opens the session.

mod default;
mod factory;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use default::{DefaultConnection, DefaultConnectionFactory, HttpConfig, HttpConfigBuilder};
pub use factory::{BackendRegistry, ConnectionFactory};
pub use types::{ApiRequest, ApiResponse, Connection, ConnectionRequest};
