//! Server configuration
//!
//! Servers are declared in YAML:
//!
//! ```yaml
//! servers:
//!   - server_url: https://gitea.example.com
//!     credentials_id: gitea-bot
//!     alias_url: https://git.internal.example.com
//! ```
//!
//! Credentials themselves live elsewhere; `credentials_id` only names them.

use crate::auth::AuthToken;
use crate::connection::ConnectionRequest;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

/// One configured server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API base, e.g. `https://gitea.example.com`
    pub server_url: String,

    /// Identifier of the credentials to use against this server
    #[serde(default)]
    pub credentials_id: Option<String>,

    /// Alternative URL the same server is reachable under
    #[serde(default)]
    pub alias_url: Option<String>,
}

impl ServerConfig {
    /// Create a server config with normalized URL
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let config = Self {
            server_url: server_url.into(),
            credentials_id: None,
            alias_url: None,
        };
        config.normalized()
    }

    /// Set the credentials id
    #[must_use]
    pub fn with_credentials_id(mut self, id: impl Into<String>) -> Self {
        self.credentials_id = Some(id.into());
        self
    }

    /// Set the alias URL
    pub fn with_alias_url(mut self, alias: impl Into<String>) -> Result<Self> {
        self.alias_url = Some(alias.into());
        self.normalized()
    }

    /// Validate both URLs and strip trailing slashes
    fn normalized(mut self) -> Result<Self> {
        self.server_url = normalize_url("server_url", &self.server_url)?;
        if let Some(alias) = self.alias_url.take() {
            self.alias_url = Some(normalize_url("alias_url", &alias)?);
        }
        Ok(self)
    }

    /// Request a session against this server
    pub fn connection_request(&self, auth: AuthToken) -> ConnectionRequest {
        ConnectionRequest::new(self.server_url.clone()).auth(auth)
    }

    /// Check whether `url` points into this server, by server or alias URL
    pub fn matches(&self, url: &str) -> bool {
        let url = url.trim_end_matches('/');
        std::iter::once(self.server_url.as_str())
            .chain(self.alias_url.as_deref())
            .any(|base| {
                url.strip_prefix(base)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
    }
}

fn normalize_url(field: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(value).map_err(|e| Error::InvalidConfigValue {
        field: field.to_string(),
        message: format!("'{value}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidConfigValue {
            field: field.to_string(),
            message: format!("'{value}' must use http or https"),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Top-level servers file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServersConfig {
    /// Configured servers
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl ServersConfig {
    /// Find the server owning `url`
    pub fn find(&self, url: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.matches(url))
    }

    /// Find a server by credentials id
    pub fn find_by_credentials_id(&self, id: &str) -> Option<&ServerConfig> {
        self.servers
            .iter()
            .find(|s| s.credentials_id.as_deref() == Some(id))
    }
}

/// Load and validate a servers file
pub fn load_servers(path: impl AsRef<Path>) -> Result<ServersConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read servers file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_servers_from_str(&content)
}

/// Parse and validate servers YAML
pub fn load_servers_from_str(yaml: &str) -> Result<ServersConfig> {
    let raw: ServersConfig = serde_yaml::from_str(yaml)?;
    let servers = raw
        .servers
        .into_iter()
        .map(ServerConfig::normalized)
        .collect::<Result<Vec<_>>>()?;
    Ok(ServersConfig { servers })
}
