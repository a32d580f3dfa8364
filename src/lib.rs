// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Gitea Client
//!
//! A pluggable REST client for Gitea-compatible Git hosting servers
//! (Gitea, Forgejo, Codeberg).
//!
//! ## Features
//!
//! - **Pluggable Backends**: Backends compete for each connection request by priority
//! - **Unified Auth**: Anonymous, access token and HTTP Basic behind one `AuthToken`
//! - **Credential Conversion**: Register converters for foreign credential types
//! - **Link Header Pagination**: Listings transparently follow `rel="next"`
//! - **Cancellation**: In-flight requests abort on a `CancellationToken`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gitea_client::{AuthToken, BackendRegistry, ConnectionRequest, GiteaClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let request = ConnectionRequest::new("https://gitea.example.com")
//!         .auth(AuthToken::bearer("my-token"));
//!
//!     let mut client = GiteaClient::open(BackendRegistry::global(), &request).await?;
//!     let owner = client.fetch_owner("my-org").await?;
//!     for repo in client.fetch_repositories(&owner).await? {
//!         println!("{}", repo.full_name);
//!     }
//!     client.close().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   GiteaClient (typed API)                    │
//! │  fetch_repositories()  fetch_pull_requests()  create_hook()  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────────┬─────────────┴─────────┬──────────────────────┐
//! │     Auth      │      Connection       │      Pagination      │
//! ├───────────────┼───────────────────────┼──────────────────────┤
//! │ AuthToken     │ BackendRegistry       │ PageLinks            │
//! │ AuthConverters│ ConnectionFactory     │ PagedResult          │
//! │               │ DefaultConnection     │ fetch_all            │
//! └───────────────┴───────────────────────┴──────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document API model fields before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Auth tokens and credential conversion
pub mod auth;

/// Connection requests, backends and the default HTTP backend
pub mod connection;

/// Link header parsing and paged fetches
pub mod pagination;

/// Typed Gitea API
pub mod api;

/// Server configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::{with_client, GiteaClient, HookScope};
pub use auth::{AuthConverters, AuthToken};
pub use config::{load_servers, ServerConfig};
pub use connection::{BackendRegistry, Connection, ConnectionFactory, ConnectionRequest};
pub use pagination::{fetch_all, PageLinks, PagedResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
