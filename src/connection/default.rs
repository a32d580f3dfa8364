//! Default HTTP backend
//!
//! Sends each request with reqwest, attaching the token's `Authorization`
//! header and reading the full body before returning.

use super::factory::ConnectionFactory;
use super::types::{ApiRequest, ApiResponse, Connection, ConnectionRequest};
use crate::auth::AuthToken;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP backend
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("gitea-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Create a new config builder
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }
}

/// Builder for HTTP backend config
#[derive(Default)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpConfig {
        self.config
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Opens [`DefaultConnection`]s; claims every request at the lowest priority
#[derive(Debug, Clone, Default)]
pub struct DefaultConnectionFactory {
    config: HttpConfig,
}

impl DefaultConnectionFactory {
    /// Create a factory with custom HTTP settings
    pub fn with_config(config: HttpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionFactory for DefaultConnectionFactory {
    fn name(&self) -> &str {
        "default-http"
    }

    fn can_open(&self, _request: &ConnectionRequest) -> bool {
        true
    }

    fn priority(&self, _request: &ConnectionRequest) -> i32 {
        i32::MIN
    }

    async fn open(&self, request: &ConnectionRequest) -> Result<Box<dyn Connection>> {
        let connection = DefaultConnection::open(request, self.config.clone())?;
        Ok(Box::new(connection))
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Session backed by a reqwest client
pub struct DefaultConnection {
    server_url: Url,
    auth: AuthToken,
    config: HttpConfig,
    cancellation: Option<CancellationToken>,
    /// `None` once closed
    client: Option<Client>,
}

impl DefaultConnection {
    /// Validate the request and build the transport
    pub fn open(request: &ConnectionRequest, config: HttpConfig) -> Result<Self> {
        let server_url = Url::parse(request.server_url())?;
        if !matches!(server_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Unsupported URL scheme '{}', expected http or https",
                server_url.scheme()
            )));
        }
        if server_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Server URL '{server_url}' cannot be used as a base URL"
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            server_url,
            auth: request.auth_token().clone(),
            config,
            cancellation: request.cancellation_token().cloned(),
            client: Some(client),
        })
    }

    async fn send(&self, client: &Client, request: ApiRequest) -> Result<ApiResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (key, value) in &self.config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid value for header '{key}': {e}")))?;
            headers.append(name, value);
        }

        // The token always replaces a configured Authorization header
        if let Some(value) = self.auth.authorization_header() {
            let mut value = HeaderValue::from_str(&value)
                .map_err(|_| Error::config("Credentials contain characters not allowed in a header"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut req = client
            .request(request.method.into(), request.url.clone())
            .headers(headers);

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Connection for DefaultConnection {
    fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn auth(&self) -> &AuthToken {
        &self.auth
    }

    async fn execute(&mut self, request: ApiRequest) -> Result<ApiResponse> {
        let client = self.client.as_ref().ok_or(Error::UseAfterClose)?;
        let method = request.method;
        let url = request.url.clone();
        debug!("{} {}", method, url);

        let response = match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!("Request interrupted: {} {}", method, url);
                        return Err(Error::Interrupted);
                    }
                    response = self.send(client, request) => response?,
                }
            }
            None => self.send(client, request).await?,
        };

        debug!("{} {} -> {}", method, url, response.status);
        response.error_for_status()
    }

    async fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            debug!("Closed connection to {}", self.server_url);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

impl std::fmt::Debug for DefaultConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultConnection")
            .field("server_url", &self.server_url.as_str())
            .field("auth", &self.auth.kind())
            .field("closed", &self.client.is_none())
            .finish_non_exhaustive()
    }
}
