//! Connection types
//!
//! The raw request/response records every backend speaks, the session
//! trait, and the request describing which session to open.

use super::factory::ConnectionFactory;
use crate::auth::AuthToken;
use crate::error::{Error, Result};
use crate::pagination::PageLinks;
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

// ============================================================================
// Connection Request
// ============================================================================

/// Describes the session to open: server, credentials and optional backend
#[derive(Clone)]
pub struct ConnectionRequest {
    server_url: String,
    auth: AuthToken,
    preferred_backend: Option<Arc<dyn ConnectionFactory>>,
    cancellation: Option<CancellationToken>,
}

impl ConnectionRequest {
    /// Create an anonymous request for the given server
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            auth: AuthToken::Anonymous,
            preferred_backend: None,
            cancellation: None,
        }
    }

    /// Authenticate with the given token
    #[must_use]
    pub fn auth(mut self, auth: AuthToken) -> Self {
        self.auth = auth;
        self
    }

    /// Bypass resolution and open through this backend
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn ConnectionFactory>) -> Self {
        self.preferred_backend = Some(backend);
        self
    }

    /// Interrupt in-flight requests when this token is cancelled
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Server URL as supplied by the caller
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Credentials for the session
    pub fn auth_token(&self) -> &AuthToken {
        &self.auth
    }

    /// Explicitly chosen backend, if any
    pub fn preferred_backend(&self) -> Option<&Arc<dyn ConnectionFactory>> {
        self.preferred_backend.as_ref()
    }

    /// Cancellation token, if any
    pub fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

impl fmt::Debug for ConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRequest")
            .field("server_url", &self.server_url)
            .field("auth", &self.auth)
            .field(
                "preferred_backend",
                &self.preferred_backend.as_ref().map(|b| b.name().to_string()),
            )
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

// ============================================================================
// Wire records
// ============================================================================

/// A single API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including query
    pub url: Url,
    /// JSON body
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    /// Create a request without a body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    /// GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// DELETE request
    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set the JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful (2xx) response with its body fully read
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: String,
}

impl ApiResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header line; repeating a name adds another line
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Other(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Other(format!("Invalid header value: {e}")))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `Error::HttpStatus`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status, self.body))
        }
    }

    /// Raw `Link` header, with multiple field lines joined by `", "`
    pub fn link_header(&self) -> Option<String> {
        let lines: Vec<String> = self
            .headers
            .get_all(LINK)
            .iter()
            .map(|value| match value.to_str() {
                Ok(text) => text.to_string(),
                Err(_) => {
                    warn!("Link header is not visible ASCII, decoding lossily");
                    String::from_utf8_lossy(value.as_bytes()).into_owned()
                }
            })
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join(", "))
        }
    }

    /// Pagination links from the `Link` header
    pub fn links(&self) -> PageLinks {
        PageLinks::parse(self.link_header().as_deref())
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::decode(format!("Failed to decode response body as JSON: {e}"))
        })
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A live session bound to one server and one auth token
///
/// Not shareable between tasks: every operation takes `&mut self`.
#[async_trait]
pub trait Connection: Send {
    /// Server this session talks to
    fn server_url(&self) -> &Url;

    /// Credentials of this session
    fn auth(&self) -> &AuthToken;

    /// Send one request.
    ///
    /// Returns `Ok` for 2xx responses only; other statuses become
    /// `Error::HttpStatus` with the body preserved. Fails with
    /// `Error::UseAfterClose` once the connection is closed.
    async fn execute(&mut self, request: ApiRequest) -> Result<ApiResponse>;

    /// Release the transport. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Check if `close` has been called
    fn is_closed(&self) -> bool;
}

impl fmt::Debug for dyn Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("server_url", &self.server_url().as_str())
            .field("auth", &self.auth().kind())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
