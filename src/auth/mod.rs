//! Authentication module
//!
//! Supports: anonymous access, access tokens and HTTP Basic credentials.
//!
//! `AuthToken` is the closed set of ways a connection can authenticate.
//! `AuthConverters` turns credential objects owned by other systems into an
//! `AuthToken` without this crate depending on their types.

mod converter;
mod types;

pub use converter::{AuthConverter, AuthConverters, SingleSecret, UsernameSecret};
pub use types::{AuthKind, AuthToken, SecretText, UsernamePassword};
